//! # API crate: fullstack server functions for the registration site
//!
//! Defines every Dioxus server function the web frontend calls, the Postgres store
//! behind them, and [`RemoteStore`], which lets the browser drive the same
//! [`roster`] workflow through those functions.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`db`] | `server` | Postgres store singleton, insert listener, error classification |
//! | [`feed`] | none | Cursor and batch types of the long-polled insert feed |
//! | [`remote`] | none | [`roster::RegistrationStore`] over the server functions |
//! | `settings` | `server` | Layered configuration (`config.toml`, environment) |
//!
//! ## Server functions exposed here
//!
//! Every public `async fn` in this file is compiled twice: once with the server logic
//! (behind `#[cfg(feature = "server")]`) and once as a client stub that forwards the
//! call over HTTP.
//!
//! Store failures are part of the reply ([`StoreReply`]), so the client can tell a
//! duplicate email from a dropped connection. A `ServerFnError` always means the
//! request itself failed.
//!
//! - `create_registration`, `list_registrations`, `registration_by_email`
//! - `feed_head`, `feed_since` for the live insert feed

use dioxus::prelude::*;
use roster::{NewRegistration, Registration, StoreError};

pub mod db;
pub mod feed;
pub mod remote;
#[cfg(feature = "server")]
mod settings;

pub use feed::{FeedBatch, FeedCursor, FeedPosition};
pub use remote::{into_store_result, RemoteStore};
#[cfg(feature = "server")]
pub use settings::Settings;

/// Outcome of a store operation, as carried in a server function reply.
pub type StoreReply<T> = Result<T, StoreError>;

/// Insert a registration. The row is re-checked here before it reaches the database.
#[cfg(feature = "server")]
#[post("/api/registrations")]
pub async fn create_registration(
    registration: NewRegistration,
) -> Result<StoreReply<Registration>, ServerFnError> {
    if let Err(e) = registration.check() {
        tracing::warn!(error = %e, "rejected registration");
        return Ok(Err(StoreError::CheckViolation(e.to_string())));
    }

    let store = db::store().map_err(|e| ServerFnError::new(e.to_string()))?;
    let reply = store.insert(registration).await;
    match &reply {
        Ok(record) => tracing::info!(id = %record.id, "registration stored"),
        Err(e) => tracing::warn!(error = %e, "registration insert failed"),
    }
    Ok(reply)
}

#[cfg(not(feature = "server"))]
#[post("/api/registrations")]
pub async fn create_registration(
    registration: NewRegistration,
) -> Result<StoreReply<Registration>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// All registrations, newest first.
#[cfg(feature = "server")]
#[get("/api/registrations")]
pub async fn list_registrations() -> Result<StoreReply<Vec<Registration>>, ServerFnError> {
    let store = db::store().map_err(|e| ServerFnError::new(e.to_string()))?;
    let reply = store.all().await;
    if let Err(e) = &reply {
        tracing::error!(error = %e, "listing registrations failed");
    }
    Ok(reply)
}

#[cfg(not(feature = "server"))]
#[get("/api/registrations")]
pub async fn list_registrations() -> Result<StoreReply<Vec<Registration>>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Look up a registration by email.
#[cfg(feature = "server")]
#[post("/api/registrations/lookup")]
pub async fn registration_by_email(
    email: String,
) -> Result<StoreReply<Option<Registration>>, ServerFnError> {
    let store = db::store().map_err(|e| ServerFnError::new(e.to_string()))?;
    Ok(store.by_email(&email).await)
}

#[cfg(not(feature = "server"))]
#[post("/api/registrations/lookup")]
pub async fn registration_by_email(
    email: String,
) -> Result<StoreReply<Option<Registration>>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Where a new feed starts: everything committed so far counts as served.
#[cfg(feature = "server")]
#[get("/api/registrations/feed/head")]
pub async fn feed_head() -> Result<StoreReply<FeedPosition>, ServerFnError> {
    let store = db::store().map_err(|e| ServerFnError::new(e.to_string()))?;
    Ok(store.head().await)
}

#[cfg(not(feature = "server"))]
#[get("/api/registrations/feed/head")]
pub async fn feed_head() -> Result<StoreReply<FeedPosition>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Registrations not yet served at `position`. Waits for an insert when there are
/// none yet.
#[cfg(feature = "server")]
#[post("/api/registrations/feed")]
pub async fn feed_since(position: FeedPosition) -> Result<StoreReply<FeedBatch>, ServerFnError> {
    let store = db::store().map_err(|e| ServerFnError::new(e.to_string()))?;
    Ok(store.wait_after(position).await)
}

#[cfg(not(feature = "server"))]
#[post("/api/registrations/feed")]
pub async fn feed_since(position: FeedPosition) -> Result<StoreReply<FeedBatch>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}
