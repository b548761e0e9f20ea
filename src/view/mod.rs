//! The reading list view-controller.
//!
//! A [`ReadingListView`] is one mounted page: it owns the view state, loads the
//! approved list, listens for table changes, handles the submission form and
//! drives the confirmation notice and detail modal.

pub mod filter;
pub mod form;
pub mod listener;
pub mod loader;
pub mod modal;
pub mod notice;
pub mod state;

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::errors::AppError;
use crate::models::Recommendation;
use crate::store::RecommendationTable;
use form::FormEdit;
use loader::{load_recommendations, LoadTokens};
use modal::{ClickTarget, ViewportMetrics};
use notice::NoticeSequencer;
use state::{Action, ViewSnapshot, ViewState};

pub struct ReadingListView {
    table: Arc<dyn RecommendationTable>,
    state: Mutex<ViewState>,
    tokens: LoadTokens,
    notice: NoticeSequencer,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ReadingListView {
    /// Mount a view: subscribe to table changes, then run the initial load.
    pub async fn mount(table: Arc<dyn RecommendationTable>) -> Arc<Self> {
        let changes = table.subscribe();
        let view = Arc::new(Self {
            table,
            state: Mutex::new(ViewState::default()),
            tokens: LoadTokens::default(),
            notice: NoticeSequencer::new(),
            listener: Mutex::new(None),
        });

        let handle = listener::spawn_listener(Arc::downgrade(&view), changes);
        *view.listener.lock() = Some(handle);

        view.reload().await;
        view
    }

    /// Stop listening for changes and cancel the notice timers.
    pub fn teardown(&self) {
        if let Some(handle) = self.listener.lock().take() {
            handle.abort();
        }
        self.notice.cancel();
    }

    fn dispatch(&self, action: Action) {
        self.state.lock().apply(action);
    }

    /// Replace the cached list with a fresh load. Responses from superseded
    /// loads are dropped by the reducer.
    pub async fn reload(&self) {
        let token = self.tokens.next();
        self.dispatch(Action::LoadStarted { token });

        let outcome = load_recommendations(self.table.as_ref()).await;

        self.dispatch(Action::LoadFinished {
            token,
            recommendations: outcome.recommendations,
            source: outcome.source,
        });
    }

    pub fn set_search(&self, search: impl Into<String>) {
        self.dispatch(Action::SearchChanged(search.into()));
    }

    pub fn edit_form(&self, edit: FormEdit) {
        self.dispatch(Action::FormEdited(edit));
    }

    /// Submit the form. The inserted row is returned, though it stays out of
    /// the visible list until a moderator approves it.
    pub async fn submit(&self) -> Result<Recommendation, AppError> {
        let new = {
            let mut state = self.state.lock();
            if state.submitting {
                return Err(AppError::Conflict(
                    "A submission is already in progress".to_string(),
                ));
            }
            match state.form.validate() {
                Ok(new) => {
                    state.apply(Action::SubmitStarted);
                    new
                }
                Err(e) => {
                    state.apply(Action::ValidationFailed(e.message()));
                    return Err(e);
                }
            }
        };

        match self.table.insert(&new).await {
            Ok(row) => {
                tracing::info!(id = %row.id, title = %row.title, "Recommendation submitted for review");
                self.notice.start();
                self.dispatch(Action::SubmitSucceeded);
                self.reload().await;
                Ok(row)
            }
            Err(e) => {
                tracing::warn!("Submission failed: {}", e);
                self.dispatch(Action::SubmitFailed(e.message()));
                Err(e)
            }
        }
    }

    pub fn dismiss_alert(&self) {
        self.dispatch(Action::AlertDismissed);
    }

    /// Open the detail modal for a cached entry.
    pub fn open_modal(&self, id: &str, metrics: ViewportMetrics) -> Result<(), AppError> {
        let mut state = self.state.lock();
        let entry = state
            .find(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Recommendation {} not found", id)))?;
        state.apply(Action::ModalOpened { entry, metrics });
        Ok(())
    }

    pub fn click_modal(&self, target: ClickTarget) {
        self.dispatch(Action::ModalClicked(target));
    }

    pub fn close_modal(&self) {
        self.dispatch(Action::ModalClosed);
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let notice = self.notice.phase();
        self.state.lock().snapshot(notice)
    }
}

impl Drop for ReadingListView {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fake::{approved, FakeTable};
    use crate::store::ChangeKind;
    use loader::ListSource;
    use notice::NoticePhase;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn fill_form(view: &ReadingListView, title: &str, author: &str) {
        view.edit_form(FormEdit {
            title: Some(title.into()),
            author: Some(author.into()),
            tags: Some("Sci-Fi".into()),
            notes: Some("Spice".into()),
            contributor: Some("Alia".into()),
        });
    }

    async fn mounted(table: &Arc<FakeTable>) -> Arc<ReadingListView> {
        ReadingListView::mount(table.clone() as Arc<dyn RecommendationTable>).await
    }

    #[tokio::test]
    async fn test_mount_loads_approved_rows() {
        let table = Arc::new(FakeTable::with_rows(vec![approved(
            "a",
            "Dune",
            "Frank Herbert",
            "2024-01-01T00:00:00Z",
        )]));
        let view = mounted(&table).await;

        let snapshot = view.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.source, ListSource::Live);
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rows[0].entry.title, "Dune");
    }

    #[tokio::test]
    async fn test_missing_table_shows_sample_set() {
        let table = Arc::new(FakeTable::default());
        table.missing.store(true, Ordering::SeqCst);
        let view = mounted(&table).await;

        let snapshot = view.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.source, ListSource::Sample);
        let titles: Vec<_> = snapshot.rows.iter().map(|r| r.entry.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["To Kill a Mockingbird", "1984", "The Great Gatsby"]
        );
    }

    #[tokio::test]
    async fn test_invalid_submission_never_inserts() {
        let table = Arc::new(FakeTable::default());
        let view = mounted(&table).await;

        fill_form(&view, "Dune", "   ");
        let err = view.submit().await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(table.insert_calls.load(Ordering::SeqCst), 0);

        let snapshot = view.snapshot();
        assert!(snapshot.alert.is_some());
        assert!(!snapshot.submitting);
        assert_eq!(snapshot.form.title, "Dune");
        assert_eq!(snapshot.notice.phase, NoticePhase::Hidden);
    }

    #[tokio::test]
    async fn test_successful_submission_clears_form_and_starts_notice() {
        let table = Arc::new(FakeTable::default());
        let view = mounted(&table).await;

        fill_form(&view, "Dune", "Frank Herbert");
        let row = view.submit().await.unwrap();
        assert!(!row.approved);
        assert_eq!(table.insert_calls.load(Ordering::SeqCst), 1);

        let snapshot = view.snapshot();
        assert_eq!(snapshot.form, form::FormFields::default());
        assert!(!snapshot.submitting);
        assert_eq!(snapshot.notice.phase, NoticePhase::Entering);
        // Unapproved, so still not visible.
        assert!(snapshot.rows.is_empty());
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_form() {
        let table = Arc::new(FakeTable::default());
        table.fail_insert.store(true, Ordering::SeqCst);
        let view = mounted(&table).await;

        fill_form(&view, "Dune", "Frank Herbert");
        assert!(view.submit().await.is_err());

        let snapshot = view.snapshot();
        assert_eq!(snapshot.form.title, "Dune");
        assert_eq!(snapshot.form.contributor, "Alia");
        assert!(!snapshot.submitting);
        assert_eq!(
            snapshot.alert.as_deref(),
            Some("Error submitting recommendation: insert rejected")
        );
        assert_eq!(snapshot.notice.phase, NoticePhase::Hidden);
    }

    #[tokio::test]
    async fn test_change_notification_reloads() {
        let table = Arc::new(FakeTable::default());
        let view = mounted(&table).await;

        fill_form(&view, "Dune", "Frank Herbert");
        let row = view.submit().await.unwrap();
        assert!(view.snapshot().rows.is_empty());

        table.approve(&row.id).await;

        let mut visible = false;
        for _ in 0..50 {
            if view.snapshot().rows.len() == 1 {
                visible = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(visible, "approved row never appeared");
    }

    #[tokio::test]
    async fn test_teardown_unsubscribes() {
        let table = Arc::new(FakeTable::default());
        let view = mounted(&table).await;
        assert_eq!(table.subscriber_count(), 1);

        view.teardown();
        for _ in 0..50 {
            if table.subscriber_count() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(table.subscriber_count(), 0);

        table.notify(ChangeKind::Delete);
        let fetches = table.fetch_calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(table.fetch_calls.load(Ordering::SeqCst), fetches);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_load_does_not_overwrite() {
        let table = Arc::new(FakeTable::with_rows(vec![approved(
            "a",
            "Dune",
            "Frank Herbert",
            "2024-01-01T00:00:00Z",
        )]));
        let view = mounted(&table).await;

        // The first reload is slow and fails; the second is fast and succeeds.
        *table.fetch_delay.lock().await = Some(Duration::from_millis(500));
        table.fail_fetch.store(true, Ordering::SeqCst);
        let slow = {
            let view = view.clone();
            tokio::spawn(async move { view.reload().await })
        };
        tokio::task::yield_now().await;

        *table.fetch_delay.lock().await = None;
        table.fail_fetch.store(false, Ordering::SeqCst);
        view.reload().await;
        assert_eq!(view.snapshot().source, ListSource::Live);

        slow.await.unwrap();
        let snapshot = view.snapshot();
        assert_eq!(snapshot.source, ListSource::Live);
        assert_eq!(snapshot.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_open_modal_unknown_entry() {
        let table = Arc::new(FakeTable::default());
        let view = mounted(&table).await;
        let err = view
            .open_modal("missing", ViewportMetrics::default())
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(view.snapshot().modal.is_none());
    }
}
