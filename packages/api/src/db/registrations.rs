//! `student_registrations` on Postgres.
//!
//! Inserts are announced by an `AFTER INSERT` trigger that sends the new row's id on
//! the [`INSERT_CHANNEL`] notification channel. One `PgListener` per process reads
//! that channel, loads each row and rebroadcasts it to every in-process subscriber.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream;
use roster::{
    NewRegistration, Registration, RegistrationStore, StoreError, StoreEvent, Subscription,
};
use sqlx::postgres::{PgListener, PgPool, PgPoolOptions};
use sqlx::FromRow;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::feed::{FeedBatch, FeedCursor, FeedPosition, FEED_LOOKBACK_SECS};
use crate::Settings;

/// Notification channel written by the insert trigger.
pub const INSERT_CHANNEL: &str = "student_registrations_insert";

const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";

const COLUMNS: &str =
    "id, name, mobile, email, college, course, year, tech_knowledge, created_at, updated_at";

/// Rows handed out by one feed poll.
const FEED_LIMIT: i64 = 500;

#[derive(Debug, FromRow)]
struct RegistrationRow {
    id: Uuid,
    name: String,
    mobile: String,
    email: String,
    college: String,
    course: String,
    year: String,
    tech_knowledge: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = StoreError;

    fn try_from(row: RegistrationRow) -> Result<Self, StoreError> {
        let year = row
            .year
            .parse()
            .map_err(|e: roster::ValidationError| StoreError::other(e.to_string()))?;
        Ok(Registration {
            id: row.id,
            name: row.name,
            mobile: row.mobile,
            email: row.email,
            college: row.college,
            course: row.course,
            year,
            tech_knowledge: row.tech_knowledge,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_records(rows: Vec<RegistrationRow>) -> Result<Vec<Registration>, StoreError> {
    rows.into_iter().map(Registration::try_from).collect()
}

/// Translate a driver error into the store taxonomy.
pub fn classify(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) => {
            let code = db.code().map(|c| c.into_owned());
            match code.as_deref() {
                Some(UNIQUE_VIOLATION) => StoreError::UniqueViolation {
                    constraint: db.constraint().map(str::to_owned),
                },
                Some(CHECK_VIOLATION) => StoreError::CheckViolation(
                    db.constraint().unwrap_or(db.message()).to_owned(),
                ),
                _ => StoreError::Other {
                    code,
                    message: db.message().to_owned(),
                },
            }
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Transport(err.to_string()),
        _ => StoreError::other(err.to_string()),
    }
}

/// Decode the row id carried by an insert notification.
pub fn decode_notification(payload: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(payload.trim())
        .map_err(|e| StoreError::other(format!("bad insert notification {payload:?}: {e}")))
}

async fn select_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Registration>, StoreError> {
    let row: Option<RegistrationRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM student_registrations WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(classify)?;

    row.map(Registration::try_from).transpose()
}

/// Postgres implementation of [`RegistrationStore`].
#[derive(Debug)]
pub struct PgStore {
    pool: PgPool,
    inserts: broadcast::Sender<Registration>,
    feed_wait: Duration,
}

impl PgStore {
    pub async fn connect(settings: &Settings) -> Result<Self, sqlx::Error> {
        let options = settings.database.connect_options()?;
        let pool = PgPoolOptions::new()
            .max_connections(settings.database.pool)
            .connect_with(options)
            .await?;
        tracing::info!(pool = settings.database.pool, "connected to registration store");
        Ok(Self::with_pool(pool, Duration::from_secs(settings.feed.wait)))
    }

    pub fn with_pool(pool: PgPool, feed_wait: Duration) -> Self {
        let (inserts, _) = broadcast::channel(256);
        Self {
            pool,
            inserts,
            feed_wait,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Start the process-wide `LISTEN` task feeding [`PgStore::subscribe`].
    pub async fn start_listener(&self) -> Result<(), sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(INSERT_CHANNEL).await?;
        let inserts = self.inserts.clone();
        let pool = self.pool.clone();

        tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        let id = match decode_notification(notification.payload()) {
                            Ok(id) => id,
                            Err(e) => {
                                tracing::warn!(error = %e, "dropping insert notification");
                                continue;
                            }
                        };
                        match select_by_id(&pool, id).await {
                            Ok(Some(record)) => {
                                // No receivers is fine: nobody is watching.
                                let _ = inserts.send(record);
                            }
                            Ok(None) => tracing::warn!(%id, "notified row is gone"),
                            Err(e) => {
                                tracing::warn!(%id, error = %e, "could not load notified row")
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "insert listener failed, reconnecting");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        tracing::info!(channel = INSERT_CHANNEL, "listening for new registrations");
        Ok(())
    }

    /// A receiver for rows inserted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Registration> {
        self.inserts.subscribe()
    }

    pub async fn insert(&self, registration: NewRegistration) -> Result<Registration, StoreError> {
        let row: RegistrationRow = sqlx::query_as(&format!(
            "INSERT INTO student_registrations (name, mobile, email, college, course, year, tech_knowledge)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(&registration.name)
        .bind(&registration.mobile)
        .bind(&registration.email)
        .bind(&registration.college)
        .bind(&registration.course)
        .bind(registration.year.label())
        .bind(&registration.tech_knowledge)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)?;

        row.try_into()
    }

    pub async fn all(&self) -> Result<Vec<Registration>, StoreError> {
        let rows: Vec<RegistrationRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM student_registrations ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        into_records(rows)
    }

    pub async fn by_email(&self, email: &str) -> Result<Option<Registration>, StoreError> {
        let row: Option<RegistrationRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM student_registrations WHERE email = $1"
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?;

        row.map(Registration::try_from).transpose()
    }

    /// Where a new feed starts: the newest row and every row in the window behind it.
    pub async fn head(&self) -> Result<FeedPosition, StoreError> {
        let window: Vec<(DateTime<Utc>, Uuid)> = sqlx::query_as(
            "SELECT created_at, id FROM student_registrations
             WHERE created_at >= (SELECT MAX(created_at) FROM student_registrations)
                                 - make_interval(secs => $1)",
        )
        .bind(FEED_LOOKBACK_SECS as f64)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(FeedPosition::holding(
            window
                .into_iter()
                .map(|(created_at, id)| FeedCursor { created_at, id }),
        ))
    }

    /// Rows `position` has not been served yet, oldest first.
    pub async fn after(&self, position: &FeedPosition) -> Result<Vec<Registration>, StoreError> {
        let rows: Vec<RegistrationRow> = match position.window_start() {
            Some(start) => sqlx::query_as(&format!(
                "SELECT {COLUMNS} FROM student_registrations
                 WHERE created_at >= $1
                 ORDER BY created_at ASC, id ASC LIMIT $2"
            ))
            .bind(start)
            .bind(FEED_LIMIT + position.seen.len() as i64)
            .fetch_all(&self.pool)
            .await,
            None => sqlx::query_as(&format!(
                "SELECT {COLUMNS} FROM student_registrations
                 ORDER BY created_at ASC, id ASC LIMIT $1"
            ))
            .bind(FEED_LIMIT)
            .fetch_all(&self.pool)
            .await,
        }
        .map_err(classify)?;

        let mut records = into_records(rows)?;
        records.retain(|record| position.admits(record));
        records.truncate(FEED_LIMIT as usize);
        Ok(records)
    }

    /// Long-poll for rows after `position`, waiting up to the configured feed wait.
    pub async fn wait_after(&self, position: FeedPosition) -> Result<FeedBatch, StoreError> {
        // Subscribe before querying so an insert between the two is not missed.
        let mut inserts = self.subscribe();

        let rows = self.after(&position).await?;
        if !rows.is_empty() {
            return Ok(FeedBatch::after(position, rows));
        }

        match tokio::time::timeout(self.feed_wait, inserts.recv()).await {
            Err(_elapsed) => return Ok(FeedBatch::after(position, Vec::new())),
            Ok(Err(broadcast::error::RecvError::Closed)) => {
                return Err(StoreError::Transport("insert listener stopped".into()))
            }
            Ok(Ok(_)) | Ok(Err(broadcast::error::RecvError::Lagged(_))) => {}
        }

        let rows = self.after(&position).await?;
        Ok(FeedBatch::after(position, rows))
    }
}

impl RegistrationStore for PgStore {
    async fn create(&self, registration: NewRegistration) -> Result<Registration, StoreError> {
        self.insert(registration).await
    }

    async fn list(&self) -> Result<Vec<Registration>, StoreError> {
        self.all().await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Registration>, StoreError> {
        self.by_email(email).await
    }

    async fn subscribe_inserts(&self) -> Result<Subscription, StoreError> {
        let receiver = self.subscribe();
        tracing::debug!(
            subscribers = self.inserts.receiver_count(),
            "registration subscription opened"
        );

        let events = stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(record) => return Some((StoreEvent::Inserted(record), receiver)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber lagged behind insert feed");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        Ok(Subscription::new(events))
    }
}
