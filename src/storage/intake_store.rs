use std::{ops::Deref, path::Path};

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::utils::clock::Clock;

use super::{
    entities::{IntakeRecord, IntakeStats},
    error::{StorageError, StorageResult},
};

/// File name of the database inside the application directory.
pub const DATABASE_FILE: &str = "waterbreak.db";

/// Fixed width so that text comparison in SQLite matches chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS intake (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp DATETIME NOT NULL,
    amount INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS intake_timestamp ON intake (timestamp);
";

/// Interface for the append-only intake log.
#[cfg_attr(test, mockall::automock)]
pub trait IntakeStore {
    /// Creates the intake table if it doesn't exist yet. Safe to call repeatedly.
    fn ensure_schema(&self) -> StorageResult<()>;

    /// Appends a record for `amount` milliliters, timestamped with the current time.
    fn save(&self, amount: i64) -> StorageResult<IntakeRecord>;

    /// Number of records and their summed amount with `timestamp >= cutoff`.
    fn stats_since(&self, cutoff: DateTime<Utc>) -> StorageResult<IntakeStats>;
}

impl<T: Deref> IntakeStore for T
where
    T::Target: IntakeStore,
{
    fn ensure_schema(&self) -> StorageResult<()> {
        self.deref().ensure_schema()
    }

    fn save(&self, amount: i64) -> StorageResult<IntakeRecord> {
        self.deref().save(amount)
    }

    fn stats_since(&self, cutoff: DateTime<Utc>) -> StorageResult<IntakeStats> {
        self.deref().stats_since(cutoff)
    }
}

/// The main realization of [IntakeStore]. Queries are blocking and meant to be run directly on
/// the reminder loop; every one of them touches at most a day of rows.
pub struct SqliteIntakeStore {
    connection: Connection,
    clock: Box<dyn Clock>,
}

impl SqliteIntakeStore {
    /// Opens (creating if needed) the database at `path`. The parent directory is created too.
    pub fn open(path: &Path, clock: Box<dyn Clock>) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!("Opening intake database {path:?}");
        let connection = Connection::open(path)?;
        Ok(Self { connection, clock })
    }

    pub fn open_in_memory(clock: Box<dyn Clock>) -> StorageResult<Self> {
        Ok(Self {
            connection: Connection::open_in_memory()?,
            clock,
        })
    }
}

impl IntakeStore for SqliteIntakeStore {
    fn ensure_schema(&self) -> StorageResult<()> {
        self.connection.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn save(&self, amount: i64) -> StorageResult<IntakeRecord> {
        let timestamp = format_timestamp(self.clock.time());
        let (id, stored_timestamp, amount) = self.connection.query_row(
            "INSERT INTO intake (timestamp, amount) VALUES (?1, ?2)
             RETURNING id, timestamp, amount",
            params![timestamp, amount],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )?;

        let record = IntakeRecord {
            id,
            timestamp: parse_timestamp(&stored_timestamp)?,
            amount,
        };
        info!("Saved intake record {:?}", record);
        Ok(record)
    }

    fn stats_since(&self, cutoff: DateTime<Utc>) -> StorageResult<IntakeStats> {
        let stats = self.connection.query_row(
            "SELECT COUNT(*), COALESCE(SUM(amount), 0) FROM intake WHERE timestamp >= ?1",
            params![format_timestamp(cutoff)],
            |row| {
                Ok(IntakeStats {
                    count: row.get(0)?,
                    total_ml: row.get(1)?,
                })
            },
        )?;
        debug!("Stats since {cutoff}: {stats:?}");
        Ok(stats)
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|v| v.and_utc())
        .map_err(|_| StorageError::InvalidTimestamp(value.into()))
}
