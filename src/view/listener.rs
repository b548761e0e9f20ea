//! Reloads a mounted view whenever the table reports a change.

use std::sync::Weak;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use super::ReadingListView;
use crate::store::TableChange;

/// Spawn the listener task. It ends when the view is dropped or the channel
/// closes; aborting the handle drops the receiver and so unsubscribes.
pub fn spawn_listener(
    view: Weak<ReadingListView>,
    mut changes: broadcast::Receiver<TableChange>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => {
                    tracing::debug!(
                        kind = change.kind.as_str(),
                        revision = change.revision,
                        "Change notification"
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Change listener lagged by {} notifications", skipped);
                }
                Err(RecvError::Closed) => {
                    tracing::warn!("Change notification channel closed");
                    break;
                }
            }

            let Some(view) = view.upgrade() else {
                break;
            };
            view.reload().await;
        }
    })
}
