use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, Mutex};

use super::{ChangeKind, RecommendationTable, TableChange, CHANGE_CHANNEL_CAPACITY};
use crate::errors::AppError;
use crate::models::{NewRecommendation, Recommendation};

/// In-memory table used by unit tests.
pub struct FakeTable {
    pub rows: Mutex<Vec<Recommendation>>,
    pub missing: AtomicBool,
    pub fail_fetch: AtomicBool,
    pub fail_insert: AtomicBool,
    pub insert_calls: AtomicU64,
    pub fetch_calls: AtomicU64,
    pub fetch_delay: Mutex<Option<Duration>>,
    changes: broadcast::Sender<TableChange>,
    revision: AtomicU64,
}

impl Default for FakeTable {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            rows: Mutex::new(Vec::new()),
            missing: AtomicBool::new(false),
            fail_fetch: AtomicBool::new(false),
            fail_insert: AtomicBool::new(false),
            insert_calls: AtomicU64::new(0),
            fetch_calls: AtomicU64::new(0),
            fetch_delay: Mutex::new(None),
            changes,
            revision: AtomicU64::new(0),
        }
    }
}

impl FakeTable {
    pub fn with_rows(rows: Vec<Recommendation>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    /// Simulate a moderator approving a row from outside the service.
    pub async fn approve(&self, id: &str) {
        let mut rows = self.rows.lock().await;
        if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
            row.approved = true;
        }
        drop(rows);
        self.notify(ChangeKind::Update);
    }

    pub fn notify(&self, kind: ChangeKind) {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        let _ = self.changes.send(TableChange { kind, revision });
    }

    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    async fn check(&self) -> Result<(), AppError> {
        if self.missing.load(Ordering::SeqCst) {
            return Err(AppError::Configuration(
                "Reading list table is not available".to_string(),
            ));
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AppError::Database("connection reset".to_string()));
        }
        Ok(())
    }
}

pub fn approved(id: &str, title: &str, author: &str, created_at: &str) -> Recommendation {
    Recommendation {
        id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        tags: None,
        notes: None,
        contributor: None,
        approved: true,
        created_at: created_at.to_string(),
    }
}

#[async_trait]
impl RecommendationTable for FakeTable {
    async fn count(&self) -> Result<i64, AppError> {
        // The failure mode is fixed when the probe is issued, not when it resolves.
        let outcome = self.check().await;
        let delay = *self.fetch_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        outcome?;
        Ok(self.rows.lock().await.len() as i64)
    }

    async fn fetch_all(&self) -> Result<Vec<Recommendation>, AppError> {
        self.check().await?;
        let mut rows = self.rows.lock().await.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn fetch_approved(&self) -> Result<Vec<Recommendation>, AppError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.fetch_all().await?;
        Ok(rows.into_iter().filter(|r| r.approved).collect())
    }

    async fn insert(&self, new: &NewRecommendation) -> Result<Recommendation, AppError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(AppError::Database("insert rejected".to_string()));
        }
        let row = Recommendation {
            id: uuid::Uuid::new_v4().to_string(),
            title: new.title.clone(),
            author: new.author.clone(),
            tags: new.tags.clone(),
            notes: new.notes.clone(),
            contributor: new.contributor.clone(),
            approved: false,
            created_at: Utc::now().to_rfc3339(),
        };
        self.rows.lock().await.push(row.clone());
        self.notify(ChangeKind::Insert);
        Ok(row)
    }

    fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.changes.subscribe()
    }
}
