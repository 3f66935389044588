use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use futures::channel::mpsc::{unbounded, UnboundedSender};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{NewRegistration, Registration};
use crate::store::{RegistrationStore, StoreEvent, Subscription};

/// Constraint name reported on duplicate emails, matching the Postgres schema.
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "student_registrations_email_key";

/// In-memory RegistrationStore for testing and local development.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<Registration>,
    subscribers: Vec<(u64, UnboundedSender<StoreEvent>)>,
    next_subscriber: u64,
    last_created: Option<DateTime<Utc>>,
    offline: bool,
    create_calls: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable store: every call fails with `Transport`.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Number of `create` calls received, successful or not.
    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn reachable(&self) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::Transport("memory store is offline".into()))
        } else {
            Ok(())
        }
    }

    /// Strictly increasing creation time, so ordering never ties.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(ts);
        ts
    }

    fn publish(&mut self, event: StoreEvent) {
        self.subscribers
            .retain(|(_, tx)| tx.unbounded_send(event.clone()).is_ok());
    }
}

impl RegistrationStore for MemoryStore {
    async fn create(&self, registration: NewRegistration) -> Result<Registration, StoreError> {
        let mut inner = self.lock();
        inner.create_calls += 1;
        inner.reachable()?;

        registration
            .check()
            .map_err(|e| StoreError::CheckViolation(e.to_string()))?;
        if inner.rows.iter().any(|r| r.email == registration.email) {
            return Err(StoreError::UniqueViolation {
                constraint: Some(EMAIL_UNIQUE_CONSTRAINT.to_string()),
            });
        }

        let created_at = inner.next_timestamp();
        let record = Registration::from_new(registration, Uuid::new_v4(), created_at);
        inner.rows.push(record.clone());
        inner.publish(StoreEvent::Inserted(record.clone()));
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<Registration>, StoreError> {
        let inner = self.lock();
        inner.reachable()?;
        let mut rows = inner.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Registration>, StoreError> {
        let inner = self.lock();
        inner.reachable()?;
        let email = email.trim().to_lowercase();
        Ok(inner.rows.iter().find(|r| r.email == email).cloned())
    }

    async fn subscribe_inserts(&self) -> Result<Subscription, StoreError> {
        let mut inner = self.lock();
        inner.reachable()?;

        let (tx, rx) = unbounded();
        let id = inner.next_subscriber;
        inner.next_subscriber += 1;
        inner.subscribers.push((id, tx));
        tracing::debug!(subscriber = id, "memory store subscription opened");

        let store = self.inner.clone();
        Ok(Subscription::new(rx).on_release(move || {
            let mut inner = store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            inner.subscribers.retain(|(sid, _)| *sid != id);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearOfStudy;

    fn payload(name: &str, email: &str) -> NewRegistration {
        NewRegistration {
            name: name.into(),
            mobile: "555".into(),
            email: email.into(),
            college: "MIT".into(),
            course: "CS".into(),
            year: YearOfStudy::Second,
            tech_knowledge: "Beginner".into(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let store = MemoryStore::new();

        assert!(store.list().await.unwrap().is_empty());

        store.create(payload("Ana", "ana@x.com")).await.unwrap();
        store.create(payload("Bob", "bob@x.com")).await.unwrap();

        let rows = store.list().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Bob");
        assert_eq!(rows[1].name, "Ana");
        assert!(rows[0].created_at > rows[1].created_at);
        assert_ne!(rows[0].id, rows[1].id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let store = MemoryStore::new();
        store.create(payload("Ana", "dup@x.com")).await.unwrap();

        let err = store.create(payload("Another", "dup@x.com")).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::UniqueViolation {
                constraint: Some(EMAIL_UNIQUE_CONSTRAINT.into())
            }
        );
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_unchecked_payload() {
        let store = MemoryStore::new();
        let err = store.create(payload("", "x@y.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::CheckViolation(_)));
    }

    #[tokio::test]
    async fn test_offline_is_transport_error() {
        let store = MemoryStore::new();
        store.set_offline(true);

        let err = store.create(payload("Ana", "ana@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
        assert!(matches!(store.list().await, Err(StoreError::Transport(_))));
        assert_eq!(store.create_calls(), 1);

        store.set_offline(false);
        assert!(store.create(payload("Ana", "ana@x.com")).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_by_email_normalizes() {
        let store = MemoryStore::new();
        store.create(payload("Ana", "ana@x.com")).await.unwrap();

        let found = store.find_by_email("  ANA@X.com ").await.unwrap();
        assert_eq!(found.map(|r| r.name), Some("Ana".to_string()));
        assert!(store.find_by_email("nobody@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_subscription_receives_inserts() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe_inserts().await.unwrap();

        let created = store.create(payload("Ana", "ana@x.com")).await.unwrap();

        let event = sub.next_event().await.unwrap();
        assert_eq!(event, StoreEvent::Inserted(created));
    }

    #[tokio::test]
    async fn test_dropping_subscription_unregisters() {
        let store = MemoryStore::new();
        let first = store.subscribe_inserts().await.unwrap();
        let _second = store.subscribe_inserts().await.unwrap();
        assert_eq!(store.subscriber_count(), 2);

        drop(first);
        assert_eq!(store.subscriber_count(), 1);

        // Publishing still works for the remaining subscriber.
        store.create(payload("Ana", "ana@x.com")).await.unwrap();
        assert_eq!(store.subscriber_count(), 1);
    }
}
