//! # Database module: the Postgres-backed registration store
//!
//! Everything here is gated behind `#[cfg(feature = "server")]` so client (WASM)
//! builds never pull in SQLx or Tokio networking code.
//!
//! ## Design
//!
//! The store is a **process-wide singleton** backed by a [`tokio::sync::OnceCell`].
//! [`init_store`] is called once by the server binary at startup: it opens the
//! connection pool from [`crate::Settings`], starts the single `LISTEN` connection
//! that fans insert notifications out to every subscriber, and caches the result.
//! Server functions then borrow it through [`store`]. It is never torn down.
//!
//! ## Re-exports
//!
//! - [`init_store`] builds the singleton; fails if the database is unreachable.
//! - [`store`] returns `&'static PgStore`, or a transport error before init.
//! - [`PgStore`] is the [`roster::RegistrationStore`] implementation.

#[cfg(feature = "server")]
mod pool;
#[cfg(feature = "server")]
mod registrations;

#[cfg(feature = "server")]
pub use pool::{init_store, store};
#[cfg(feature = "server")]
pub use registrations::{classify, decode_notification, PgStore, INSERT_CHANNEL};
