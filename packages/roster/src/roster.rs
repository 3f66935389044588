//! # Roster: the admin view's in-memory copy of the table
//!
//! [`Roster`] is plain state: the records (newest first), the set of ids already
//! present, the loading/refreshing flags and the search term. Every mutation goes
//! through a method so the id set and the list never disagree:
//!
//! | Method | Effect |
//! |--------|--------|
//! | [`begin_load`](Roster::begin_load) | Raises `loading` (initial) or `refreshing` (manual re-sync). |
//! | [`finish_load`](Roster::finish_load) | Clears both flags. On success replaces the list wholesale; on failure keeps it. |
//! | [`apply`](Roster::apply) | Prepends an inserted record unless its id is already known. |
//!
//! A listing and the insert feed are not ordered relative to each other, so the same
//! row can arrive through both. [`Roster::apply`] drops the second copy.
//!
//! [`RosterViewer`] drives a `Roster` against a [`RegistrationStore`] for callers
//! that can hold `&mut` across an await (tests, tools). The Dioxus dashboard keeps a
//! `Roster` in a signal and calls the phase methods directly.

use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{ExportError, LoadError, StoreError};
use crate::export::{export_csv, CsvExport};
use crate::models::Registration;
use crate::store::{RegistrationStore, StoreEvent, Subscription};

/// Which flag a load raises.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadKind {
    Initial,
    Refresh,
}

/// Counters shown on the dashboard cards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RosterStats {
    pub total: usize,
    pub today: usize,
    pub filtered: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Roster {
    records: Vec<Registration>,
    ids: HashSet<Uuid>,
    loading: bool,
    refreshing: bool,
    search: String,
}

/// True when `term` appears, case-insensitively, in the name, email, college or course.
pub fn matches_term(record: &Registration, term: &str) -> bool {
    let term = term.to_lowercase();
    [&record.name, &record.email, &record.college, &record.course]
        .into_iter()
        .any(|value| value.to_lowercase().contains(&term))
}

/// Client-side search over `records`. An empty term keeps everything.
pub fn filter_records<'a>(records: &'a [Registration], term: &str) -> Vec<&'a Registration> {
    records.iter().filter(|r| matches_term(r, term)).collect()
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Registration] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn begin_load(&mut self, kind: LoadKind) {
        match kind {
            LoadKind::Initial => self.loading = true,
            LoadKind::Refresh => self.refreshing = true,
        }
    }

    /// Settle a load started with [`Roster::begin_load`]. Returns the new row count.
    pub fn finish_load(
        &mut self,
        result: Result<Vec<Registration>, StoreError>,
    ) -> Result<usize, LoadError> {
        self.loading = false;
        self.refreshing = false;
        match result {
            Ok(records) => {
                self.replace_all(records);
                Ok(self.records.len())
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load registrations");
                Err(LoadError::Fetch(err))
            }
        }
    }

    /// Replace the list, keeping the first copy of any repeated id.
    pub fn replace_all(&mut self, records: Vec<Registration>) {
        self.ids.clear();
        self.records = records
            .into_iter()
            .filter(|r| self.ids.insert(r.id))
            .collect();
    }

    /// Merge a feed event. Returns `true` when the record was new.
    pub fn apply(&mut self, event: StoreEvent) -> bool {
        match event {
            StoreEvent::Inserted(record) => {
                if !self.ids.insert(record.id) {
                    tracing::debug!(id = %record.id, "ignoring insert already in roster");
                    return false;
                }
                self.records.insert(0, record);
                true
            }
        }
    }

    /// Records matching the current search term.
    pub fn filtered(&self) -> Vec<&Registration> {
        filter_records(&self.records, &self.search)
    }

    pub fn stats(&self, today: NaiveDate) -> RosterStats {
        RosterStats {
            total: self.records.len(),
            today: self
                .records
                .iter()
                .filter(|r| r.created_at.date_naive() == today)
                .count(),
            filtered: self.filtered().len(),
        }
    }

    /// CSV of the filtered view, named after `date`.
    pub fn export(&self, date: NaiveDate) -> Result<CsvExport, ExportError> {
        export_csv(self.filtered(), date)
    }
}

/// Drives a [`Roster`] against a store held by reference.
pub struct RosterViewer<'s, S> {
    store: &'s S,
    roster: Roster,
}

impl<'s, S: RegistrationStore> RosterViewer<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            roster: Roster::new(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    /// Fetch every record and replace the local list.
    pub async fn load_all(&mut self) -> Result<usize, LoadError> {
        self.load(LoadKind::Initial).await
    }

    /// Manual re-sync.
    pub async fn refresh(&mut self) -> Result<usize, LoadError> {
        self.load(LoadKind::Refresh).await
    }

    /// Open the insert feed. The caller owns the returned handle.
    ///
    /// Call this before [`RosterViewer::load_all`]: a row inserted between the two
    /// then shows up in the listing, the feed, or both.
    pub async fn activate(&self) -> Result<Subscription, LoadError> {
        self.store
            .subscribe_inserts()
            .await
            .map_err(LoadError::Subscribe)
    }

    /// Wait for one event and merge it. `None` once the feed has ended.
    pub async fn pump(&mut self, subscription: &mut Subscription) -> Option<bool> {
        let event = subscription.next_event().await?;
        Some(self.roster.apply(event))
    }

    async fn load(&mut self, kind: LoadKind) -> Result<usize, LoadError> {
        self.roster.begin_load(kind);
        let result = self.store.list().await;
        self.roster.finish_load(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::models::{NewRegistration, YearOfStudy};
    use chrono::{TimeZone, Utc};

    fn record(name: &str, email: &str, college: &str, course: &str) -> Registration {
        Registration {
            id: Uuid::new_v4(),
            name: name.into(),
            mobile: "555".into(),
            email: email.into(),
            college: college.into(),
            course: course.into(),
            year: YearOfStudy::Third,
            tech_knowledge: "Intermediate".into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    fn payload(name: &str, email: &str) -> NewRegistration {
        NewRegistration {
            name: name.into(),
            mobile: "555".into(),
            email: email.into(),
            college: "MIT".into(),
            course: "CS".into(),
            year: YearOfStudy::First,
            tech_knowledge: "none".into(),
        }
    }

    #[test]
    fn test_filter_is_case_insensitive_across_fields() {
        let records = vec![
            record("Bob", "bob@x.com", "MIT", "CS"),
            record("Alice", "alice@uni.edu", "Stanford", "Physics"),
        ];

        let names = |term: &str| -> Vec<String> {
            filter_records(&records, term)
                .into_iter()
                .map(|r| r.name.clone())
                .collect()
        };

        assert_eq!(names("bo"), vec!["Bob"]);
        assert_eq!(names("BO"), vec!["Bob"]);
        assert_eq!(names("uni.edu"), vec!["Alice"]);
        assert_eq!(names("stan"), vec!["Alice"]);
        assert_eq!(names("phys"), vec!["Alice"]);
        assert!(names("zz").is_empty());
        assert_eq!(names("").len(), 2);
    }

    #[test]
    fn test_filter_ignores_other_fields() {
        let records = vec![record("Bob", "bob@x.com", "MIT", "CS")];
        // mobile and tech knowledge are not searched
        assert!(filter_records(&records, "555").is_empty());
        assert!(filter_records(&records, "intermediate").is_empty());
    }

    #[test]
    fn test_apply_deduplicates_by_id() {
        let bob = record("Bob", "bob@x.com", "MIT", "CS");
        let mut roster = Roster::new();
        roster.replace_all(vec![bob.clone()]);

        assert!(!roster.apply(StoreEvent::Inserted(bob.clone())));
        assert_eq!(roster.len(), 1);

        let ann = record("Ann", "ann@x.com", "MIT", "CS");
        assert!(roster.apply(StoreEvent::Inserted(ann.clone())));
        assert_eq!(roster.records()[0], ann);
        assert_eq!(roster.records()[1], bob);
    }

    #[test]
    fn test_replace_all_collapses_duplicates() {
        let bob = record("Bob", "bob@x.com", "MIT", "CS");
        let mut roster = Roster::new();
        roster.replace_all(vec![bob.clone(), bob.clone()]);
        assert_eq!(roster.len(), 1);
        assert!(roster.contains(&bob.id));
    }

    #[test]
    fn test_failed_load_keeps_previous_list() {
        let mut roster = Roster::new();
        roster.begin_load(LoadKind::Initial);
        roster
            .finish_load(Ok(vec![record("Bob", "bob@x.com", "MIT", "CS")]))
            .unwrap();

        roster.begin_load(LoadKind::Refresh);
        assert!(roster.refreshing());
        let err = roster
            .finish_load(Err(StoreError::Transport("down".into())))
            .unwrap_err();

        assert!(matches!(err, LoadError::Fetch(StoreError::Transport(_))));
        assert_eq!(roster.len(), 1);
        assert!(!roster.loading());
        assert!(!roster.refreshing());
    }

    #[test]
    fn test_stats() {
        let mut old = record("Old", "old@x.com", "MIT", "CS");
        old.created_at = Utc.with_ymd_and_hms(2024, 2, 28, 23, 59, 0).unwrap();
        let mut roster = Roster::new();
        roster.replace_all(vec![
            record("Bob", "bob@x.com", "MIT", "CS"),
            record("Ann", "ann@x.com", "Yale", "Law"),
            old,
        ]);
        roster.set_search("mit");

        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            roster.stats(today),
            RosterStats {
                total: 3,
                today: 2,
                filtered: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_viewer_loads_and_follows_inserts() {
        let store = MemoryStore::new();
        store.create(payload("Ana", "ana@x.com")).await.unwrap();

        let mut viewer = RosterViewer::new(&store);
        let mut sub = viewer.activate().await.unwrap();
        assert_eq!(viewer.load_all().await.unwrap(), 1);

        let created = store.create(payload("Bob", "bob@x.com")).await.unwrap();
        assert_eq!(viewer.pump(&mut sub).await, Some(true));

        assert_eq!(viewer.roster().len(), 2);
        assert_eq!(viewer.roster().records()[0], created);
    }

    #[tokio::test]
    async fn test_viewer_survives_load_event_race() {
        let store = MemoryStore::new();
        let mut viewer = RosterViewer::new(&store);
        let mut sub = viewer.activate().await.unwrap();

        // The insert lands before the listing, so it arrives through both paths.
        store.create(payload("Ana", "ana@x.com")).await.unwrap();
        viewer.load_all().await.unwrap();
        assert_eq!(viewer.pump(&mut sub).await, Some(false));

        assert_eq!(viewer.roster().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_during_load_is_not_lost() {
        let store = MemoryStore::new();
        store.create(payload("Ana", "ana@x.com")).await.unwrap();

        // Feed first, listing second: whatever lands in between is in one or both.
        let mut viewer = RosterViewer::new(&store);
        let mut sub = viewer.activate().await.unwrap();
        let gap = store.create(payload("Gap", "gap@x.com")).await.unwrap();
        assert_eq!(viewer.load_all().await.unwrap(), 2);
        let later = store.create(payload("Later", "later@x.com")).await.unwrap();

        assert_eq!(viewer.pump(&mut sub).await, Some(false));
        assert_eq!(viewer.pump(&mut sub).await, Some(true));

        let stored = store.list().await.unwrap();
        assert_eq!(viewer.roster().len(), stored.len());
        assert!(viewer.roster().contains(&gap.id));
        assert_eq!(viewer.roster().records()[0], later);
    }

    #[tokio::test]
    async fn test_viewer_refresh_and_load_error() {
        let store = MemoryStore::new();
        let mut viewer = RosterViewer::new(&store);
        viewer.load_all().await.unwrap();

        store.create(payload("Ana", "ana@x.com")).await.unwrap();
        assert_eq!(viewer.refresh().await.unwrap(), 1);

        store.set_offline(true);
        assert!(matches!(viewer.refresh().await, Err(LoadError::Fetch(_))));
        assert_eq!(viewer.roster().len(), 1);
        assert!(matches!(viewer.activate().await, Err(LoadError::Subscribe(_))));
    }

    #[tokio::test]
    async fn test_viewer_teardown_releases_subscription() {
        let store = MemoryStore::new();
        {
            let viewer = RosterViewer::new(&store);
            let _sub = viewer.activate().await.unwrap();
            assert_eq!(store.subscriber_count(), 1);
        }
        assert_eq!(store.subscriber_count(), 0);
    }
}
