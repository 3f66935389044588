//! [`RegistrationStore`] over the server functions, for the browser.

use std::collections::VecDeque;

use dioxus::prelude::ServerFnError;
use futures::stream;
use roster::{
    NewRegistration, Registration, RegistrationStore, StoreError, StoreEvent, Subscription,
};

use crate::feed::FeedPosition;
use crate::StoreReply;

/// Flatten a server-function result. A failed request is a transport error; a store
/// error reported by the server is passed through unchanged.
pub fn into_store_result<T>(reply: Result<StoreReply<T>, ServerFnError>) -> StoreReply<T> {
    match reply {
        Ok(reply) => reply,
        Err(e) => Err(StoreError::Transport(e.to_string())),
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RemoteStore;

impl RemoteStore {
    pub fn new() -> Self {
        Self
    }
}

struct FeedState {
    position: FeedPosition,
    pending: VecDeque<Registration>,
}

impl RegistrationStore for RemoteStore {
    async fn create(&self, registration: NewRegistration) -> Result<Registration, StoreError> {
        into_store_result(crate::create_registration(registration).await)
    }

    async fn list(&self) -> Result<Vec<Registration>, StoreError> {
        into_store_result(crate::list_registrations().await)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Registration>, StoreError> {
        into_store_result(crate::registration_by_email(email.to_string()).await)
    }

    /// Starts at the current head, so only rows committed after this call are
    /// delivered. The stream ends at the first failed poll.
    async fn subscribe_inserts(&self) -> Result<Subscription, StoreError> {
        let position = into_store_result(crate::feed_head().await)?;
        let state = FeedState {
            position,
            pending: VecDeque::new(),
        };

        let events = stream::unfold(state, |mut state| async move {
            loop {
                if let Some(record) = state.pending.pop_front() {
                    return Some((StoreEvent::Inserted(record), state));
                }
                match into_store_result(crate::feed_since(state.position.clone()).await) {
                    Ok(batch) => {
                        state.position = batch.position;
                        state.pending.extend(batch.records);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "registration feed closed");
                        return None;
                    }
                }
            }
        });

        Ok(Subscription::new(events))
    }
}
