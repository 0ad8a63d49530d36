#![allow(dead_code)]

use sqlx::SqlitePool;
use std::time::Duration;
use tempfile::TempDir;

use medisort_infrastructure::config::StoreConfig;
use medisort_infrastructure::persistence::Database;

/// Fresh migrated database in a temp directory. Keep the `TempDir` alive for
/// the duration of the test.
pub async fn setup_db() -> (SqlitePool, TempDir) {
    setup_db_with(StoreConfig::default()).await
}

pub async fn setup_db_with(config: StoreConfig) -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("medisort-test.db");
    let path = path.to_str().expect("utf-8 temp path");

    let db = Database::with_config(path, &config)
        .await
        .expect("open database");
    db.run_migrations().await.expect("run migrations");

    (db.pool().clone(), dir)
}

pub fn contended_config() -> StoreConfig {
    StoreConfig::new()
        .with_busy_timeout(Duration::from_secs(30))
        .with_max_connections(8)
}
