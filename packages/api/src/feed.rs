//! Live-feed wire types.
//!
//! Browsers cannot hold a Postgres `LISTEN`, so the insert feed is served as a long
//! poll: the client keeps a [`FeedPosition`] and repeatedly asks for rows it has not
//! been served yet. Rows are ordered by `(created_at, id)`, which is total even when
//! two inserts share a timestamp.
//!
//! `created_at` is stamped when the inserting transaction starts, not when it
//! commits, so a row can become visible after a newer-stamped one was already
//! served. Each poll therefore re-reads [`FEED_LOOKBACK_SECS`] behind the newest
//! delivered row and skips the ids the position already holds.

use chrono::{DateTime, Duration, Utc};
use roster::Registration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How far behind the newest delivered row each poll looks again.
pub const FEED_LOOKBACK_SECS: i64 = 5;

/// Position in the `(created_at, id)` ordering of the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeedCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl FeedCursor {
    pub fn of(record: &Registration) -> Self {
        Self {
            created_at: record.created_at,
            id: record.id,
        }
    }
}

/// What a client has been served: the newest row, and every row it already holds
/// inside the lookback window behind it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPosition {
    pub head: Option<FeedCursor>,
    pub seen: Vec<FeedCursor>,
}

impl FeedPosition {
    /// A position that already holds `rows`.
    pub fn holding(rows: impl IntoIterator<Item = FeedCursor>) -> Self {
        let mut position = Self::default();
        position.advance(rows);
        position
    }

    /// Oldest `created_at` the next poll reads. `None` reads from the beginning.
    pub fn window_start(&self) -> Option<DateTime<Utc>> {
        self.head
            .map(|head| head.created_at - Duration::seconds(FEED_LOOKBACK_SECS))
    }

    /// Whether `record` still has to be delivered.
    pub fn admits(&self, record: &Registration) -> bool {
        if self.seen.iter().any(|seen| seen.id == record.id) {
            return false;
        }
        match self.window_start() {
            Some(start) => record.created_at >= start,
            None => true,
        }
    }

    /// Take in delivered rows and forget the ones that fell out of the window.
    pub fn advance(&mut self, rows: impl IntoIterator<Item = FeedCursor>) {
        for row in rows {
            if self.head.is_none_or(|head| row > head) {
                self.head = Some(row);
            }
            self.seen.push(row);
        }
        if let Some(start) = self.window_start() {
            self.seen.retain(|seen| seen.created_at >= start);
        }
    }
}

/// Rows returned by one poll, oldest first, and the position to resume from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedBatch {
    pub position: FeedPosition,
    pub records: Vec<Registration>,
}

impl FeedBatch {
    /// Build a batch of rows served from `from`, advancing past them.
    pub fn after(mut from: FeedPosition, records: Vec<Registration>) -> Self {
        from.advance(records.iter().map(FeedCursor::of));
        Self {
            position: from,
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use roster::YearOfStudy;

    fn at(secs: u32, id: u128) -> Registration {
        Registration {
            id: Uuid::from_u128(id),
            name: "Ana".into(),
            mobile: "555".into(),
            email: format!("ana{id}@x.com"),
            college: "MIT".into(),
            course: "CS".into(),
            year: YearOfStudy::First,
            tech_knowledge: "none".into(),
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, secs).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_cursor_orders_by_time_then_id() {
        let a = FeedCursor::of(&at(1, 9));
        let b = FeedCursor::of(&at(2, 1));
        let c = FeedCursor::of(&at(2, 5));
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_empty_batch_keeps_position() {
        let start = FeedPosition::holding([FeedCursor::of(&at(1, 1))]);
        let batch = FeedBatch::after(start.clone(), Vec::new());
        assert!(batch.is_empty());
        assert_eq!(batch.position, start);

        let fresh = FeedBatch::after(FeedPosition::default(), Vec::new());
        assert_eq!(fresh.position.head, None);
        assert_eq!(fresh.position.window_start(), None);
    }

    #[test]
    fn test_batch_advances_to_newest_row() {
        let batch = FeedBatch::after(FeedPosition::default(), vec![at(3, 1), at(4, 2)]);
        assert_eq!(batch.position.head, Some(FeedCursor::of(&at(4, 2))));
        assert!(!batch.position.admits(&at(3, 1)));
        assert!(!batch.position.admits(&at(4, 2)));
        assert!(batch.position.admits(&at(5, 3)));
    }

    #[test]
    fn test_late_commit_behind_head_is_delivered() {
        // B (stamped :20) is served first. A (stamped :18) commits afterwards.
        let served = FeedBatch::after(FeedPosition::default(), vec![at(20, 2)]);
        let late = at(18, 1);

        assert!(served.position.window_start() <= Some(late.created_at));
        assert!(served.position.admits(&late));

        let next = FeedBatch::after(served.position, vec![late.clone()]);
        assert_eq!(next.position.head, Some(FeedCursor::of(&at(20, 2))));
        assert!(!next.position.admits(&late));
    }

    #[test]
    fn test_window_forgets_old_rows() {
        let mut position = FeedPosition::holding([FeedCursor::of(&at(1, 1))]);
        position.advance([FeedCursor::of(&at(10, 2))]);

        assert_eq!(position.seen, vec![FeedCursor::of(&at(10, 2))]);
        // too old to be read again, so it never needs remembering
        assert!(!position.admits(&at(1, 1)));
        assert!(!position.admits(&at(4, 9)));
        assert!(position.admits(&at(5, 9)));
    }
}
