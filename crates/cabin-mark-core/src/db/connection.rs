//! SQLite connection management.

use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::now_iso8601;
use crate::utils::error::{AppError, AppResult};

use super::schema::{INIT_SCHEMA, MIGRATIONS, SCHEMA_VERSION};

/// Shared SQLite connection.
///
/// Cloning is cheap; clones share the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish()
    }
}

impl Database {
    /// Open or create the database file at `path`.
    pub fn open(path: PathBuf, enable_wal: bool) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        };

        db.configure(enable_wal)?;

        Ok(db)
    }

    /// Open an in-memory database (tests).
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        };

        db.configure(false)?;

        Ok(db)
    }

    fn configure(&self, enable_wal: bool) -> AppResult<()> {
        let conn = self.connection()?;

        if enable_wal {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }

        conn.execute_batch(
            r#"
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
            "#,
        )?;

        Ok(())
    }

    /// Create the schema, or migrate an existing database to the current version.
    pub fn init(&self) -> AppResult<()> {
        let conn = self.connection()?;

        let table_exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
                [],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !table_exists {
            tracing::info!("Initialising database schema");

            conn.execute_batch(INIT_SCHEMA)?;
            conn.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![SCHEMA_VERSION, now_iso8601()],
            )?;

            tracing::info!(version = SCHEMA_VERSION, "Database schema initialised");
        } else {
            Self::migrate_internal(&conn)?;
        }

        Ok(())
    }

    fn migrate_internal(conn: &Connection) -> AppResult<()> {
        let current_version: i32 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap_or(0);

        tracing::debug!(version = current_version, "Current database schema version");

        for migration in MIGRATIONS {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    "Applying migration: {}",
                    migration.description
                );

                conn.execute_batch(migration.sql)?;
                conn.execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, now_iso8601()],
                )?;
            }
        }

        Ok(())
    }

    /// Lock the connection for a query.
    pub fn connection(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| AppError::General(format!("database connection lock poisoned: {}", e)))
    }

    /// Run `f` inside a transaction, committing when it returns `Ok`.
    pub fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Row counts and file size.
    pub fn stats(&self) -> AppResult<DatabaseStats> {
        let conn = self.connection()?;

        let photo_count: i64 = conn.query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))?;
        let pending_thumbnails: i64 = conn.query_row(
            "SELECT COUNT(*) FROM photos WHERE thumbnail IS NULL",
            [],
            |row| row.get(0),
        )?;
        let inspection_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM inspections", [], |row| row.get(0))?;

        let db_size = std::fs::metadata(&self.path)
            .map(|m| m.len() as i64)
            .unwrap_or(0);

        Ok(DatabaseStats {
            photo_count,
            pending_thumbnails,
            inspection_count,
            db_size,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub photo_count: i64,
    /// Legacy rows still waiting for a thumbnail backfill
    pub pending_thumbnails: i64,
    pub inspection_count: i64,
    pub db_size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db
    }

    #[test]
    fn test_fresh_database_is_empty() {
        let stats = fresh().stats().unwrap();
        assert_eq!(
            (stats.photo_count, stats.pending_thumbnails, stats.inspection_count),
            (0, 0, 0)
        );
    }

    #[test]
    fn test_fresh_database_has_photo_and_inspection_tables() {
        let db = fresh();
        let conn = db.connection().unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
            .unwrap();
        let names: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        for expected in ["photos", "inspections", "schema_version"] {
            assert!(names.iter().any(|n| n == expected), "missing table {}", expected);
        }
    }

    #[test]
    fn test_init_twice_keeps_version() {
        let db = fresh();
        db.init().unwrap();
        let conn = db.connection().unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_migrates_version_one_database() {
        let db = Database::open_in_memory().unwrap();
        {
            let conn = db.connection().unwrap();
            conn.execute_batch(
                r#"
                CREATE TABLE photos (
                    id TEXT PRIMARY KEY NOT NULL,
                    door_id TEXT NOT NULL,
                    aircraft_type TEXT NOT NULL,
                    full_image BLOB NOT NULL,
                    thumbnail BLOB,
                    timestamp TEXT NOT NULL
                );
                CREATE TABLE schema_version (version INTEGER PRIMARY KEY, applied_at TEXT NOT NULL);
                INSERT INTO schema_version (version, applied_at) VALUES (1, '2025-12-01T00:00:00Z');
                "#,
            )
            .unwrap();
        }

        db.init().unwrap();

        let conn = db.connection().unwrap();
        let version: i32 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        let has_inspections: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='inspections'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(has_inspections);
    }

    #[test]
    fn test_open_on_disk_creates_parent_dirs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("Database").join("photos.db");
        let db = Database::open(path.clone(), true).unwrap();
        db.init().unwrap();
        assert!(path.exists());
        assert_eq!(db.path(), path.as_path());
    }
}
