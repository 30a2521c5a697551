//! SQLite persistence
//!
//! [`Store`] owns the single database connection. Every write call runs in
//! its own transaction and either commits fully or not at all.
//!
//! - Typed tables: `INSERT OR IGNORE` over the natural key. A duplicate is a
//!   silent no-op, never an overwrite.
//! - `raw_api_data`: append-only audit log, duplicates allowed.

use rusqlite::{params, Connection};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::{RawRecord, Record, Table};

pub mod query;
pub mod schema;

pub use query::{format_cell, TableRows};

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite failure
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Raw record could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Row handed to a table of another kind
    #[error("row for {found} cannot be written to {expected}")]
    KindMismatch {
        /// Target table
        expected: Table,
        /// Table the row belongs to
        found: Table,
    },

    /// Typed write requested for the raw log
    #[error("{0} has no typed rows")]
    NotTyped(Table),

    /// Table name not present in the database
    #[error("no such table: {0}")]
    UnknownTable(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// SQLite-backed store for typed rows and the raw log
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        debug!("Opening store at {}", path.display());
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Create all tables if they do not exist. Safe to call on every startup.
    pub fn ensure_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(schema::SCHEMA)?;
        Ok(())
    }

    /// Insert typed rows, skipping any whose natural key already exists.
    ///
    /// Returns the number of rows actually inserted.
    ///
    /// # Errors
    /// `KindMismatch` if a row belongs to another table (checked before any
    /// write), `NotTyped` for the raw log, or the SQLite error that rolled the
    /// batch back.
    pub fn upsert_typed(&mut self, table: Table, rows: &[Record]) -> StoreResult<usize> {
        let sql = schema::insert_statement(table).ok_or(StoreError::NotTyped(table))?;

        if let Some(stray) = rows.iter().find(|row| row.table() != table) {
            return Err(StoreError::KindMismatch {
                expected: table,
                found: stray.table(),
            });
        }
        if rows.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare_cached(sql)?;
            for row in rows {
                inserted += match row {
                    Record::OpenInterest(bar) | Record::FundingRate(bar) => stmt.execute(params![
                        bar.symbol, bar.time, bar.open, bar.high, bar.low, bar.close
                    ])?,
                    Record::LongShortRatio(entry) => stmt.execute(params![
                        entry.symbol,
                        entry.exchange,
                        entry.time,
                        entry.long_percent,
                        entry.short_percent,
                        entry.long_short_ratio,
                        entry.category.as_str(),
                    ])?,
                    Record::Liquidation(entry) => stmt.execute(params![
                        entry.symbol,
                        entry.time,
                        entry.long_liquidation_usd,
                        entry.short_liquidation_usd,
                    ])?,
                };
            }
        }
        tx.commit()?;

        info!(
            table = %table,
            received = rows.len(),
            inserted = inserted,
            "Stored typed rows"
        );
        Ok(inserted)
    }

    /// Append one raw-log row per record, stamped with the current time.
    pub fn append_raw(
        &mut self,
        endpoint: &str,
        params_json: &str,
        records: &[Value],
    ) -> StoreResult<usize> {
        self.append_raw_at(endpoint, params_json, chrono::Utc::now().timestamp(), records)
    }

    /// Append raw-log rows with an explicit retrieval time (Unix seconds)
    pub fn append_raw_at(
        &mut self,
        endpoint: &str,
        params_json: &str,
        retrieved_at: i64,
        records: &[Value],
    ) -> StoreResult<usize> {
        let rows = records
            .iter()
            .map(|record| -> StoreResult<RawRecord> {
                Ok(RawRecord {
                    endpoint: endpoint.to_string(),
                    params: params_json.to_string(),
                    retrieved_at,
                    data: serde_json::to_string(record)?,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;

        self.append_raw_records(&rows)
    }

    /// Append prepared raw-log rows in one transaction
    pub fn append_raw_records(&mut self, rows: &[RawRecord]) -> StoreResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(schema::INSERT_RAW)?;
            for row in rows {
                stmt.execute(params![row.endpoint, row.params, row.retrieved_at, row.data])?;
            }
        }
        tx.commit()?;

        info!(
            endpoint = %rows[0].endpoint,
            inserted = rows.len(),
            "Stored raw records"
        );
        Ok(rows.len())
    }

    /// Underlying connection, for read-only inspection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
