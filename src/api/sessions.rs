//! Session endpoints: one session is one mounted reading list view.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::Recommendation;
use crate::view::form::FormEdit;
use crate::view::modal::{ClickTarget, ViewportMetrics};
use crate::view::state::ViewSnapshot;
use crate::view::ReadingListView;
use crate::AppState;

/// A mounted view and the last time a request touched it.
struct Session {
    view: Arc<ReadingListView>,
    last_seen: Mutex<Instant>,
}

/// Mounted views keyed by session id.
///
/// Pages never say goodbye, so sessions nobody has touched for the idle
/// timeout are torn down by [`SessionRegistry::spawn_reaper`].
#[derive(Default)]
pub struct SessionRegistry {
    views: RwLock<HashMap<Uuid, Session>>,
}

impl SessionRegistry {
    pub async fn insert(&self, view: Arc<ReadingListView>) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session {
            view,
            last_seen: Mutex::new(Instant::now()),
        };
        self.views.write().await.insert(id, session);
        id
    }

    /// Look a session up and mark it as in use.
    pub async fn get(&self, id: Uuid) -> Result<Arc<ReadingListView>, AppError> {
        let views = self.views.read().await;
        let session = views
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;
        *session.last_seen.lock() = Instant::now();
        Ok(session.view.clone())
    }

    /// Remove a session and tear its view down.
    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        let session = self
            .views
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;
        session.view.teardown();
        Ok(())
    }

    /// Tear down every mounted view.
    pub async fn clear(&self) {
        for (_, session) in self.views.write().await.drain() {
            session.view.teardown();
        }
    }

    /// Tear down sessions idle for longer than `max_idle`. Returns how many went.
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut expired = Vec::new();
        self.views.write().await.retain(|id, session| {
            let idle = now.saturating_duration_since(*session.last_seen.lock());
            if idle > max_idle {
                expired.push((*id, session.view.clone()));
                false
            } else {
                true
            }
        });
        for (id, view) in &expired {
            view.teardown();
            tracing::info!(session = %id, "Idle view torn down");
        }
        expired.len()
    }

    /// Periodically sweep idle sessions. Abort the handle to stop.
    pub fn spawn_reaper(self: &Arc<Self>, max_idle: Duration) -> JoinHandle<()> {
        let registry = Arc::downgrade(self);
        let period = (max_idle / 2).max(Duration::from_millis(10));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                let swept = registry.sweep_idle(max_idle).await;
                if swept > 0 {
                    let active = registry.len().await;
                    tracing::debug!(swept, active, "Swept idle sessions");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.views.read().await.len()
    }
}

/// A snapshot tagged with its session id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub view: ViewSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenModalRequest {
    pub entry_id: String,
    #[serde(flatten)]
    pub metrics: ViewportMetrics,
}

#[derive(Debug, Deserialize)]
pub struct ModalClickRequest {
    pub target: ClickTarget,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub submitted: Recommendation,
    pub session: SessionSnapshot,
}

fn snapshot_of(id: Uuid, view: &ReadingListView) -> SessionSnapshot {
    SessionSnapshot {
        session_id: id,
        view: view.snapshot(),
    }
}

/// POST /api/sessions - Mount a view and run its initial load.
pub async fn create_session(State(state): State<AppState>) -> ApiResult<SessionSnapshot> {
    let view = ReadingListView::mount(state.table.clone()).await;
    let id = state.sessions.insert(view.clone()).await;
    let active = state.sessions.len().await;
    tracing::info!(session = %id, active, "View mounted");
    success(snapshot_of(id, &view))
}

/// GET /api/sessions/:id - Current view snapshot.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SessionSnapshot> {
    let view = state.sessions.get(id).await?;
    success(snapshot_of(id, &view))
}

/// DELETE /api/sessions/:id - Tear the view down.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.sessions.remove(id).await?;
    tracing::info!(session = %id, "View torn down");
    success(())
}

/// PUT /api/sessions/:id/search - Update the search box.
pub async fn update_search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<SessionSnapshot> {
    let view = state.sessions.get(id).await?;
    view.set_search(request.query);
    success(snapshot_of(id, &view))
}

/// PUT /api/sessions/:id/form - Edit one or more form fields.
pub async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<FormEdit>,
) -> ApiResult<SessionSnapshot> {
    let view = state.sessions.get(id).await?;
    view.edit_form(edit);
    success(snapshot_of(id, &view))
}

/// POST /api/sessions/:id/submit - Submit the form for review.
pub async fn submit_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SubmitResponse> {
    let view = state.sessions.get(id).await?;
    let submitted = view.submit().await?;
    success(SubmitResponse {
        submitted,
        session: snapshot_of(id, &view),
    })
}

/// POST /api/sessions/:id/refresh - Reload the list.
pub async fn refresh_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SessionSnapshot> {
    let view = state.sessions.get(id).await?;
    view.reload().await;
    success(snapshot_of(id, &view))
}

/// DELETE /api/sessions/:id/alert - Dismiss the alert.
pub async fn dismiss_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SessionSnapshot> {
    let view = state.sessions.get(id).await?;
    view.dismiss_alert();
    success(snapshot_of(id, &view))
}

/// POST /api/sessions/:id/modal - Open the detail modal.
pub async fn open_modal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<OpenModalRequest>,
) -> ApiResult<SessionSnapshot> {
    let view = state.sessions.get(id).await?;
    view.open_modal(&request.entry_id, request.metrics)?;
    success(snapshot_of(id, &view))
}

/// POST /api/sessions/:id/modal/click - A click on the modal overlay.
pub async fn click_modal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ModalClickRequest>,
) -> ApiResult<SessionSnapshot> {
    let view = state.sessions.get(id).await?;
    view.click_modal(request.target);
    success(snapshot_of(id, &view))
}

/// DELETE /api/sessions/:id/modal - Close the detail modal.
pub async fn close_modal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SessionSnapshot> {
    let view = state.sessions.get(id).await?;
    view.close_modal();
    success(snapshot_of(id, &view))
}
