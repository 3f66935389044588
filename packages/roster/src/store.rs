//! # Store seam: the remote table as seen by the workflow
//!
//! [`RegistrationStore`] is the only way the submitter and the roster viewer talk to
//! persistence. The same workflow code runs against:
//!
//! - [`crate::MemoryStore`]: in-process, used by tests and local development,
//! - `api::PgStore`: Postgres through sqlx, on the server,
//! - `api::RemoteStore`: the Dioxus server functions, in the browser.
//!
//! ## Subscriptions
//!
//! [`RegistrationStore::subscribe_inserts`] returns a [`Subscription`]: a stream of
//! [`StoreEvent`]s plus a release hook. The hook runs when the subscription is
//! dropped, so holding it in a scope (a component future, a test body) is enough to
//! guarantee it is closed on every exit path.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{LocalBoxStream, Stream, StreamExt};

use crate::error::StoreError;
use crate::models::{NewRegistration, Registration};

/// Async interface to the `student_registrations` table.
pub trait RegistrationStore {
    /// Insert one row. The store assigns `id` and the timestamps.
    fn create(
        &self,
        registration: NewRegistration,
    ) -> impl Future<Output = Result<Registration, StoreError>>;

    /// Every row, newest `created_at` first.
    fn list(&self) -> impl Future<Output = Result<Vec<Registration>, StoreError>>;

    /// Look a row up by email. The address is trimmed and lowercased first.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Registration>, StoreError>>;

    /// Open a feed of insert events on the table.
    fn subscribe_inserts(&self) -> impl Future<Output = Result<Subscription, StoreError>>;
}

/// A change delivered by a subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    Inserted(Registration),
}

impl StoreEvent {
    pub fn record(&self) -> &Registration {
        match self {
            StoreEvent::Inserted(record) => record,
        }
    }
}

/// Live feed handle. Dropping it releases the underlying listener.
pub struct Subscription {
    events: LocalBoxStream<'static, StoreEvent>,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(events: impl Stream<Item = StoreEvent> + 'static) -> Self {
        Self {
            events: events.boxed_local(),
            release: None,
        }
    }

    /// Run `release` when the subscription is dropped.
    pub fn on_release(mut self, release: impl FnOnce() + 'static) -> Self {
        self.release = Some(Box::new(release));
        self
    }

    /// Wait for the next event. `None` once the feed has ended.
    pub async fn next_event(&mut self) -> Option<StoreEvent> {
        self.events.next().await
    }
}

impl Stream for Subscription {
    type Item = StoreEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<StoreEvent>> {
        self.events.poll_next_unpin(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
        tracing::debug!("registration subscription released");
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("has_release", &self.release.is_some())
            .finish()
    }
}
