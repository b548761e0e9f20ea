//! Fetches the approved list, falling back to the built-in sample set.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::errors::AppError;
use crate::models::{sample_recommendations, Recommendation};
use crate::store::RecommendationTable;

/// Identifies one load. Only the latest token may update the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadToken(u64);

/// Hands out strictly increasing [`LoadToken`]s.
#[derive(Debug, Default)]
pub struct LoadTokens(AtomicU64);

impl LoadTokens {
    pub fn next(&self) -> LoadToken {
        LoadToken(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Where the displayed list came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListSource {
    #[default]
    Live,
    Sample,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub recommendations: Vec<Recommendation>,
    pub source: ListSource,
}

/// Probe the table, then fetch approved rows newest first.
pub async fn fetch_approved_list(
    table: &dyn RecommendationTable,
) -> Result<Vec<Recommendation>, AppError> {
    table.count().await?;
    table.fetch_approved().await
}

/// Run one load. Never fails: any error yields the sample set.
pub async fn load_recommendations(table: &dyn RecommendationTable) -> LoadOutcome {
    match fetch_approved_list(table).await {
        Ok(recommendations) => {
            tracing::debug!("Loaded {} approved recommendations", recommendations.len());
            LoadOutcome {
                recommendations,
                source: ListSource::Live,
            }
        }
        Err(e) => {
            if e.is_configuration() {
                tracing::error!("Reading list table misconfigured, showing sample data: {}", e);
            } else {
                tracing::warn!("Failed to load reading list, showing sample data: {}", e);
            }
            LoadOutcome {
                recommendations: sample_recommendations(),
                source: ListSource::Sample,
            }
        }
    }
}
