//! Database repository for the recommendations table.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};
use tokio::sync::broadcast;

use crate::errors::AppError;
use crate::models::{NewRecommendation, Recommendation};
use crate::store::{RecommendationTable, TableChange, CHANGE_CHANNEL_CAPACITY};

const COLUMNS: &str = "id, title, author, tags, notes, contributor, approved, created_at";

/// SQLite-backed recommendations table.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
    table: String,
    changes: broadcast::Sender<TableChange>,
}

impl Repository {
    /// `table` must already be validated with [`crate::config::is_identifier`].
    pub fn new(pool: SqlitePool, table: impl Into<String>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            pool,
            table: table.into(),
            changes,
        }
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Sender side of the change channel, fed by the [`super::ChangeWatcher`].
    pub fn change_sender(&self) -> broadcast::Sender<TableChange> {
        self.changes.clone()
    }

    /// Current table revision and the kind of the last change, if any.
    pub async fn revision(&self) -> Result<(i64, Option<String>), AppError> {
        let row = sqlx::query("SELECT revision, last_change FROM table_revisions WHERE table_name = ?")
            .bind(&self.table)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::Configuration(format!("No revision row for table {}", self.table))
            })?;
        Ok((row.get("revision"), row.get("last_change")))
    }
}

#[async_trait]
impl RecommendationTable for Repository {
    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn fetch_all(&self) -> Result<Vec<Recommendation>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM {} ORDER BY created_at DESC",
            self.table
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(recommendation_from_row).collect())
    }

    async fn fetch_approved(&self) -> Result<Vec<Recommendation>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM {} WHERE approved = 1 ORDER BY created_at DESC",
            self.table
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(recommendation_from_row).collect())
    }

    async fn insert(&self, new: &NewRecommendation) -> Result<Recommendation, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let row = sqlx::query(&format!(
            "INSERT INTO {} ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, 0, ?) RETURNING {COLUMNS}",
            self.table
        ))
        .bind(&id)
        .bind(&new.title)
        .bind(&new.author)
        .bind(&new.tags)
        .bind(&new.notes)
        .bind(&new.contributor)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = %id, "Inserted unapproved recommendation");
        Ok(recommendation_from_row(&row))
    }

    fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.changes.subscribe()
    }
}

fn recommendation_from_row(row: &sqlx::sqlite::SqliteRow) -> Recommendation {
    let approved: i32 = row.get("approved");
    Recommendation {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        tags: row.get("tags"),
        notes: row.get("notes"),
        contributor: row.get("contributor"),
        approved: approved != 0,
        created_at: row.get("created_at"),
    }
}
