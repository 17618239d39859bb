use dioxus::fullstack::Lazy;
use jiff::Timestamp;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use types::Result;

use crate::CONFIG;
pub use session::Session;

mod session;

static POOL: Lazy<SqlitePool> = Lazy::new(|| async {
    let db_path = CONFIG.data_dir.join("db.sqlite");

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);

    SqlitePool::connect_with(options).await
});

pub fn pool() -> &'static SqlitePool {
    &*POOL
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    Ok(sqlx::migrate!("../migrations").run(pool).await?)
}

/// Drop sessions that can no longer be refreshed.
pub async fn purge_expired(pool: &SqlitePool) -> Result<u64> {
    let purged = Session::delete_expired(pool, Timestamp::now()).await?;
    if purged > 0 {
        tracing::info!(purged, "removed expired sessions");
    }
    Ok(purged)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> (SqlitePool, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let options = SqliteConnectOptions::new()
        .filename(dir.path().join("db.sqlite"))
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await.unwrap();
    migrate(&pool).await.unwrap();
    (pool, dir)
}
