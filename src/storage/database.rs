use crate::storage::errors::{Result, StorageError};
use crate::storage::schema;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, trace, warn};

/// How long a statement waits on another writer before reporting a conflict
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(2000);

/// Handle to the session store.
///
/// Each handle owns one SQLite connection. Several handles (in one process or
/// many) may share a database file; cross-handle consistency comes from the
/// schema's uniqueness constraints and versioned updates, not from this lock.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (creating if needed) the database at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        Self::open_with_timeout(db_path, DEFAULT_BUSY_TIMEOUT)
    }

    pub fn open_with_timeout(db_path: &Path, busy_timeout: Duration) -> Result<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::database_path_error(format!(
                    "Failed to create database directory: {}",
                    e
                ))
            })?;
        }

        let conn = Self::create_optimized_connection(db_path, busy_timeout)?;
        let database = Database {
            conn: Mutex::new(conn),
        };

        database.run_migrations()?;
        debug!("Opened database at {}", db_path.display());

        Ok(database)
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let database = Database {
            conn: Mutex::new(conn),
        };
        database.run_migrations()?;
        Ok(database)
    }

    /// Create a connection with optimal SQLite settings
    fn create_optimized_connection(db_path: &Path, busy_timeout: Duration) -> Result<Connection> {
        let conn = Connection::open(db_path)?;

        conn.busy_timeout(busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.pragma_update(None, "synchronous", "NORMAL")?; // Good balance of safety/speed
        conn.pragma_update(None, "cache_size", -16000)?; // 16MB cache
        conn.pragma_update(None, "temp_store", "memory")?;

        Ok(conn)
    }

    /// Generate a new unique session ID
    pub fn generate_session_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        schema::initialize_schema(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave SQLite half-written:
        // open transactions roll back when dropped.
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Execute a closure with access to the connection
    pub fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock();
        f(&conn)
    }

    /// Execute a write transaction with automatic rollback on error.
    ///
    /// The transaction takes the write lock up front (`BEGIN IMMEDIATE`), so
    /// everything read inside it is the committed state it will build on.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let started = Instant::now();
        let conn = self.lock();
        let tx = Transaction::new_unchecked(&conn, TransactionBehavior::Immediate)?;

        match f(&tx) {
            Ok(result) => {
                tx.commit()?;
                trace!("Transaction committed in {:?}", started.elapsed());
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!("Rollback failed after {}: {}", e, rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Get current Unix timestamp
    pub fn current_timestamp() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}
