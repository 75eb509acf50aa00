use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::search::UsageCounts;

/// Arguments kept before the least recently launched are dropped.
pub const DEFAULT_CAPACITY: usize = 512;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("usage store lock poisoned")]
    Poisoned,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS usage (
    argument TEXT PRIMARY KEY,
    launch_count INTEGER NOT NULL DEFAULT 0,
    last_launched INTEGER NOT NULL DEFAULT 0
)";

/// Launch counts for executed arguments, used to rank search results.
///
/// Reads go to an in-memory snapshot that is only rebuilt after a launch, so
/// ranking never touches the database.
pub struct UsageStore {
    db: Mutex<Connection>,
    snapshot: RwLock<Arc<UsageCounts>>,
    capacity: usize,
}

impl UsageStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])?;
        let store = Self {
            db: Mutex::new(conn),
            snapshot: RwLock::new(Arc::new(UsageCounts::new())),
            capacity: DEFAULT_CAPACITY,
        };
        store.prune_and_reload()?;
        Ok(store)
    }

    /// Caps the number of tracked arguments, pruning immediately.
    pub fn with_capacity(mut self, capacity: usize) -> Result<Self, StoreError> {
        self.capacity = capacity.max(1);
        self.prune_and_reload()?;
        Ok(self)
    }

    pub fn record_launch(&self, argument: &str, launched_at_epoch_secs: i64) -> Result<(), StoreError> {
        {
            let db = self.db.lock().map_err(|_| StoreError::Poisoned)?;
            db.execute(
                "INSERT INTO usage (argument, launch_count, last_launched) VALUES (?1, 1, ?2)
                 ON CONFLICT(argument) DO UPDATE SET
                    launch_count = launch_count + 1,
                    last_launched = excluded.last_launched",
                params![argument, launched_at_epoch_secs],
            )?;
        }
        self.prune_and_reload()
    }

    pub fn launch_count(&self, argument: &str) -> Result<u32, StoreError> {
        let db = self.db.lock().map_err(|_| StoreError::Poisoned)?;
        let count = db
            .query_row(
                "SELECT launch_count FROM usage WHERE argument = ?1",
                params![argument],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.unwrap_or(0))
    }

    /// Current counts. Cheap to call per keystroke.
    pub fn usage_counts(&self) -> Arc<UsageCounts> {
        match self.snapshot.read() {
            Ok(snapshot) => Arc::clone(&snapshot),
            Err(_) => Arc::default(),
        }
    }

    fn prune_and_reload(&self) -> Result<(), StoreError> {
        let capacity = i64::try_from(self.capacity).unwrap_or(i64::MAX);
        let db = self.db.lock().map_err(|_| StoreError::Poisoned)?;
        db.execute(
            "DELETE FROM usage WHERE argument NOT IN (
                SELECT argument FROM usage
                ORDER BY last_launched DESC, launch_count DESC
                LIMIT ?1
            )",
            params![capacity],
        )?;

        let mut stmt = db.prepare("SELECT argument, launch_count FROM usage")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?;
        let mut counts = UsageCounts::new();
        for row in rows {
            let (argument, count) = row?;
            counts.insert(argument, count);
        }

        let mut snapshot = self.snapshot.write().map_err(|_| StoreError::Poisoned)?;
        *snapshot = Arc::new(counts);
        Ok(())
    }
}
