//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.
//!
//! A `Database` is not `Sync`. Concurrent callers open one handle each on the
//! same file; SQLite's write lock (taken up front by [`Database::immediate`])
//! serializes the read-check-write sequences, and the busy timeout makes the
//! losing handle wait instead of failing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::{Result, StoreError};
use crate::migrations;

/// Default time a writer waits for a competing transaction.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/peach/peach.db`
    /// - macOS:   `~/Library/Application Support/ng.peach.peach/peach.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\peach\peach\data\peach.db`
    pub fn open_default() -> Result<Self> {
        let db_path = default_path()?;
        if let Some(dir) = db_path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        tracing::info!(path = %db_path.display(), "opening database");

        Self::open_at(&db_path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::prepare(conn, busy_timeout)
    }

    /// Open a private in-memory database. Mostly useful in tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?, DEFAULT_BUSY_TIMEOUT)
    }

    fn prepare(conn: Connection, busy_timeout: Duration) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(busy_timeout)?;

        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Callers should prefer the typed CRUD helpers, but direct access is
    /// occasionally needed for ad-hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }

    /// Begin a write transaction that takes the database write lock
    /// immediately. Dropping it without `commit` rolls back.
    pub(crate) fn immediate(&self) -> Result<Transaction<'_>> {
        Ok(Transaction::new_unchecked(
            &self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

/// Platform data path of the default database file.
pub fn default_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("ng", "peach", "peach").ok_or(StoreError::NoDataDir)?;
    Ok(project_dirs.data_dir().join("peach.db"))
}
