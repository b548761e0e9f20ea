//! Access to the remote recommendations table.
//!
//! The view only talks to the table through [`RecommendationTable`]. The server
//! runs against the SQLite [`crate::db::Repository`]; unit tests use an in-memory fake.

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::errors::AppError;
use crate::models::{NewRecommendation, Recommendation};

/// Capacity of the change notification channel.
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Kind of row mutation reported by a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "insert" => Some(ChangeKind::Insert),
            "update" => Some(ChangeKind::Update),
            "delete" => Some(ChangeKind::Delete),
            _ => None,
        }
    }
}

/// Push event: some row in the watched table changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableChange {
    pub kind: ChangeKind,
    /// Table revision after the change
    pub revision: i64,
}

/// The operations the reading list needs from its backing table.
#[async_trait]
pub trait RecommendationTable: Send + Sync {
    /// Lightweight existence probe. Fails with [`AppError::Configuration`] if the table is absent.
    async fn count(&self) -> Result<i64, AppError>;

    /// Every row regardless of approval, newest first.
    async fn fetch_all(&self) -> Result<Vec<Recommendation>, AppError>;

    /// Approved rows only, ordered by creation time descending.
    async fn fetch_approved(&self) -> Result<Vec<Recommendation>, AppError>;

    /// Insert an unapproved row and return its stored representation.
    async fn insert(&self, new: &NewRecommendation) -> Result<Recommendation, AppError>;

    /// Subscribe to insert/update/delete notifications. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<TableChange>;
}
