//! Turns trigger-maintained table revisions into change notifications.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::Repository;
use crate::store::{ChangeKind, TableChange};

/// Polls the revision row of a table and broadcasts a [`TableChange`] whenever it moves.
pub struct ChangeWatcher {
    repo: Repository,
    sender: broadcast::Sender<TableChange>,
    interval: Duration,
}

impl ChangeWatcher {
    pub fn new(repo: Repository, interval: Duration) -> Self {
        let sender = repo.change_sender();
        Self {
            repo,
            sender,
            interval,
        }
    }

    /// Run the polling loop on the runtime. Abort the handle to stop watching.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut last_seen = match self.repo.revision().await {
            Ok((revision, _)) => Some(revision),
            Err(e) => {
                tracing::warn!("Change watcher could not read initial revision: {}", e);
                None
            }
        };
        let mut failing = last_seen.is_none();

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            match self.repo.revision().await {
                Ok((revision, last_change)) => {
                    if failing {
                        tracing::info!("Change watcher recovered at revision {}", revision);
                        failing = false;
                    }
                    if last_seen == Some(revision) {
                        continue;
                    }
                    // The first successful read after a failure only establishes a baseline.
                    if last_seen.is_some() {
                        let kind = last_change
                            .as_deref()
                            .and_then(ChangeKind::parse)
                            .unwrap_or(ChangeKind::Update);
                        tracing::debug!(revision, kind = kind.as_str(), "Table changed");
                        // No subscribers is fine: nobody has a view mounted.
                        let _ = self.sender.send(TableChange { kind, revision });
                    }
                    last_seen = Some(revision);
                }
                Err(e) => {
                    if !failing {
                        tracing::warn!("Change watcher failed to read revision: {}", e);
                        failing = true;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::NewRecommendation;
    use crate::store::RecommendationTable;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_external_update_is_broadcast() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("watch.sqlite"), "recommendations")
            .await
            .unwrap();
        let repo = Repository::new(pool, "recommendations");
        let mut rx = repo.subscribe();

        let handle = ChangeWatcher::new(repo.clone(), Duration::from_millis(10)).spawn();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let row = repo
            .insert(&NewRecommendation {
                title: "Dune".into(),
                author: "Frank Herbert".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let change = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(change.kind, ChangeKind::Insert);

        sqlx::query("UPDATE recommendations SET approved = 1 WHERE id = ?")
            .bind(&row.id)
            .execute(repo.pool())
            .await
            .unwrap();

        let change = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(change.kind, ChangeKind::Update);
        assert_eq!(change.revision, 2);

        handle.abort();
    }
}
