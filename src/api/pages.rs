//! HTML pages.
//!
//! The page posts its form and search box back here; every handler ends on
//! the session page so the browser always shows the current snapshot.

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::render::render_page;
use crate::view::form::FormEdit;
use crate::view::ReadingListView;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// New search text, when the search box was submitted.
    pub q: Option<String>,
}

/// GET / - Mount a fresh view and send the browser to its page.
pub async fn index(State(state): State<AppState>) -> Redirect {
    let view = ReadingListView::mount(state.table.clone()).await;
    let id = state.sessions.insert(view).await;
    tracing::info!(session = %id, "View mounted from index");
    Redirect::to(&format!("/sessions/{id}"))
}

/// GET /sessions/:id - Render the session's page, applying `?q=` if present.
pub async fn session_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let view = state.sessions.get(id).await?;
    if let Some(search) = query.q {
        view.set_search(search);
    }
    Ok(Html(render_page(id, &view.snapshot())))
}

/// POST /sessions/:id/submit - Form-encoded submission from the page.
pub async fn submit_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(edit): Form<FormEdit>,
) -> Result<Redirect, AppError> {
    let view = state.sessions.get(id).await?;
    view.edit_form(edit);
    // Validation and store failures land in the page alert.
    if let Err(e) = view.submit().await {
        tracing::debug!(session = %id, "Page submission rejected: {}", e);
    }
    Ok(Redirect::to(&format!("/sessions/{id}")))
}
