//! View state and the reducer that mutates it.

use serde::Serialize;

use super::filter::filter_recommendations;
use super::form::{FormEdit, FormFields};
use super::loader::{ListSource, LoadToken};
use super::modal::{ClickTarget, DetailModal, PageStyle, ViewportMetrics};
use super::notice::NoticePhase;
use crate::models::Recommendation;

/// Everything one mounted view shows. Only [`ViewState::apply`] mutates it.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub recommendations: Vec<Recommendation>,
    pub source: ListSource,
    pub loading: bool,
    pub search: String,
    pub form: FormFields,
    pub submitting: bool,
    pub alert: Option<String>,
    pub modal: DetailModal,
    pub page: PageStyle,
    latest_token: LoadToken,
}

#[derive(Debug, Clone)]
pub enum Action {
    LoadStarted {
        token: LoadToken,
    },
    LoadFinished {
        token: LoadToken,
        recommendations: Vec<Recommendation>,
        source: ListSource,
    },
    SearchChanged(String),
    FormEdited(FormEdit),
    SubmitStarted,
    SubmitSucceeded,
    SubmitFailed(String),
    ValidationFailed(String),
    AlertDismissed,
    ModalOpened {
        entry: Recommendation,
        metrics: ViewportMetrics,
    },
    ModalClicked(ClickTarget),
    ModalClosed,
}

impl ViewState {
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::LoadStarted { token } => {
                if token > self.latest_token {
                    self.latest_token = token;
                }
                self.loading = true;
            }
            Action::LoadFinished {
                token,
                recommendations,
                source,
            } => {
                if token != self.latest_token {
                    tracing::debug!(?token, latest = ?self.latest_token, "Discarding stale load");
                    return;
                }
                self.recommendations = recommendations;
                self.source = source;
                self.loading = false;
            }
            Action::SearchChanged(search) => self.search = search,
            Action::FormEdited(edit) => self.form.apply(edit),
            Action::SubmitStarted => {
                self.submitting = true;
                self.alert = None;
            }
            Action::SubmitSucceeded => {
                self.form.clear();
                self.submitting = false;
            }
            Action::SubmitFailed(message) => {
                self.alert = Some(format!("Error submitting recommendation: {message}"));
                self.submitting = false;
            }
            Action::ValidationFailed(message) => self.alert = Some(message),
            Action::AlertDismissed => self.alert = None,
            Action::ModalOpened { entry, metrics } => {
                self.modal.open(entry, metrics, &mut self.page)
            }
            Action::ModalClicked(target) => self.modal.click(target, &mut self.page),
            Action::ModalClosed => self.modal.close(&mut self.page),
        }
    }

    /// Rows matching the current search, in cache order.
    pub fn visible(&self) -> Vec<Recommendation> {
        filter_recommendations(&self.recommendations, &self.search)
    }

    /// Look up a cached entry by id.
    pub fn find(&self, id: &str) -> Option<&Recommendation> {
        self.recommendations.iter().find(|r| r.id == id)
    }

    pub fn snapshot(&self, notice: NoticePhase) -> ViewSnapshot {
        let rows: Vec<RowView> = self.visible().into_iter().map(RowView::from).collect();
        ViewSnapshot {
            loading: self.loading,
            source: self.source,
            search: self.search.clone(),
            total: self.recommendations.len(),
            rows,
            form: self.form.clone(),
            submitting: self.submitting,
            alert: self.alert.clone(),
            notice: NoticeView {
                phase: notice,
                class_name: notice.class_name(),
            },
            modal: self.modal.selected().cloned().map(RowView::from),
            page: self.page.clone(),
        }
    }
}

/// A table row or modal body: the entry plus its parsed tag labels.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    #[serde(flatten)]
    pub entry: Recommendation,
    pub tag_labels: Vec<String>,
}

impl From<Recommendation> for RowView {
    fn from(entry: Recommendation) -> Self {
        let tag_labels = entry.tag_labels();
        Self { entry, tag_labels }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeView {
    pub phase: NoticePhase,
    pub class_name: &'static str,
}

/// Serializable picture of a view at one instant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub loading: bool,
    pub source: ListSource,
    pub search: String,
    /// Size of the cached list before filtering
    pub total: usize,
    pub rows: Vec<RowView>,
    pub form: FormFields,
    pub submitting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
    pub notice: NoticeView,
    pub modal: Option<RowView>,
    pub page: PageStyle,
}
