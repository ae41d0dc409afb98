//! Database connection pool management.
//!
//! SQLite connections are pooled with r2d2. Every connection gets foreign keys
//! enabled and file databases run in WAL mode so catalog reads do not block on
//! admin writes. Migrations run once, when the pool is created.

use std::sync::atomic::{AtomicU64, Ordering};

use marquee_common::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const POOL_SIZE: u32 = 4;

/// Open (creating if needed) the database at `db_path` and migrate it.
///
/// # Example
///
/// ```no_run
/// use marquee_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/marquee/marquee.db").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
    });

    build_and_migrate(manager)
}

/// Create a private in-memory database, shared by every connection of the pool.
///
/// Each call returns an independent database, which keeps tests isolated.
///
/// ```
/// use marquee_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let uri = format!("file:marquee_mem_{n}?mode=memory&cache=shared");

    let manager = SqliteConnectionManager::file(uri)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    build_and_migrate(manager)
}

fn build_and_migrate(manager: SqliteConnectionManager) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(POOL_SIZE)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    let conn = get_conn(&pool)?;
    let applied = migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;
    if applied > 0 {
        tracing::debug!(applied, "Database schema migrated");
    }

    Ok(pool)
}

/// Get a connection from the pool, mapping r2d2 failures to [`Error::Database`].
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory_pool() {
        let pool = init_memory_pool().unwrap();
        assert_eq!(pool.max_size(), POOL_SIZE);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_connections_share_one_memory_database() {
        let pool = init_memory_pool().unwrap();

        let conn1 = get_conn(&pool).unwrap();
        conn1
            .execute(
                "INSERT INTO admins (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
                rusqlite::params!["test-id", "testadmin", "hash", "2024-01-01T00:00:00Z"],
            )
            .unwrap();

        // A second, simultaneously held connection sees the same data.
        let conn2 = get_conn(&pool).unwrap();
        let username: String = conn2
            .query_row("SELECT username FROM admins WHERE id = ?", ["test-id"], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(username, "testadmin");
    }

    #[test]
    fn test_memory_pools_are_isolated() {
        let a = init_memory_pool().unwrap();
        let b = init_memory_pool().unwrap();

        get_conn(&a)
            .unwrap()
            .execute(
                "INSERT INTO admins (id, username, password_hash, created_at) VALUES ('1', 'x', 'h', 'now')",
                [],
            )
            .unwrap();

        let count: i64 = get_conn(&b)
            .unwrap()
            .query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_file_pool_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marquee.db");
        let path = path.to_string_lossy();

        {
            let pool = init_pool(&path).unwrap();
            get_conn(&pool)
                .unwrap()
                .execute(
                    "INSERT INTO admins (id, username, password_hash, created_at) VALUES ('1', 'root', 'h', 'now')",
                    [],
                )
                .unwrap();
        }

        let pool = init_pool(&path).unwrap();
        let count: i64 = get_conn(&pool)
            .unwrap()
            .query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
