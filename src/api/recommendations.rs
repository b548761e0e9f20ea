//! Read-only access to the approved list, without a mounted view.

use axum::extract::{Query, State};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::models::Recommendation;
use crate::view::filter::filter_recommendations;
use crate::view::loader::fetch_approved_list;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive search across title, author, tags, notes and contributor.
    #[serde(default)]
    pub q: String,
}

/// GET /api/recommendations - Approved recommendations, newest first.
///
/// Unlike a mounted view this does not fall back to sample data: table
/// errors are returned to the caller.
pub async fn list_recommendations(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> ApiResult<Vec<Recommendation>> {
    let approved = fetch_approved_list(state.table.as_ref())
        .await
        .inspect_err(|e| tracing::error!("Direct list read failed: {}", e))?;
    success(filter_recommendations(&approved, &params.q))
}
