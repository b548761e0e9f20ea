//! Database module for SQLite persistence.
//!
//! SQLite stands in for the hosted table: the recommendations table itself,
//! plus a revision row per table bumped by triggers so that edits made by
//! other processes (moderators) are observable.

mod repository;
mod watcher;

pub use repository::*;
pub use watcher::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::config::is_identifier;
use crate::errors::AppError;

/// Open the connection pool without touching the schema.
pub async fn init_pool(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Open the pool and create the table, revision row and change triggers.
pub async fn init_database(db_path: &Path, table: &str) -> Result<SqlitePool, AppError> {
    let pool = init_pool(db_path).await?;
    run_migrations(&pool, table).await?;
    Ok(pool)
}

/// Run database migrations for the given table.
pub async fn run_migrations(pool: &SqlitePool, table: &str) -> Result<(), AppError> {
    if !is_identifier(table) {
        return Err(AppError::Configuration(format!(
            "Invalid table name: {table:?}"
        )));
    }

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            tags TEXT,
            notes TEXT,
            contributor TEXT,
            approved INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_approved_created ON {table}(approved, created_at);"
    ))
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS table_revisions (
            table_name TEXT PRIMARY KEY,
            revision INTEGER NOT NULL DEFAULT 0,
            last_change TEXT,
            changed_at TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO table_revisions (table_name, revision) VALUES (?, 0)")
        .bind(table)
        .execute(pool)
        .await?;

    for (event, kind) in [("INSERT", "insert"), ("UPDATE", "update"), ("DELETE", "delete")] {
        sqlx::query(&format!(
            r#"
            CREATE TRIGGER IF NOT EXISTS {table}_after_{kind}
            AFTER {event} ON {table}
            BEGIN
                UPDATE table_revisions
                SET revision = revision + 1,
                    last_change = '{kind}',
                    changed_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                WHERE table_name = '{table}';
            END;
            "#
        ))
        .execute(pool)
        .await?;
    }

    Ok(())
}
