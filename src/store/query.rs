//! Read interface used by the viewer and the CSV export

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, OptionalExtension};

use super::{Store, StoreError, StoreResult};
use crate::RawRecord;

/// Column names plus row values of one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRows {
    /// Column names in select order
    pub columns: Vec<String>,
    /// Row values, one inner vector per row
    pub rows: Vec<Vec<SqlValue>>,
}

impl TableRows {
    /// Rows rendered as display strings
    pub fn rendered(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows
            .iter()
            .map(|row| row.iter().map(format_cell).collect())
    }
}

/// Render one SQLite value for display (`NULL` becomes an empty string)
pub fn format_cell(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Integer(n) => n.to_string(),
        SqlValue::Real(f) => f.to_string(),
        SqlValue::Text(s) => s.clone(),
        SqlValue::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl Store {
    /// Names of all tables in the database
    pub fn list_tables(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY rowid")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Whether a table of this exact name exists
    pub fn table_exists(&self, table: &str) -> StoreResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Select rows from a table, in storage order.
    ///
    /// # Errors
    /// `UnknownTable` when the name is not an existing table.
    pub fn select_rows(&self, table: &str, limit: Option<usize>) -> StoreResult<TableRows> {
        if !self.table_exists(table)? {
            return Err(StoreError::UnknownTable(table.to_string()));
        }

        let sql = format!("SELECT * FROM {} LIMIT ?1", quote_identifier(table));
        let limit = limit
            .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
            .unwrap_or(-1);

        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query(params![limit])?;
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                values.push(row.get::<_, SqlValue>(index)?);
            }
            rows.push(values);
        }

        Ok(TableRows { columns, rows })
    }

    /// Row count of a table
    pub fn count_rows(&self, table: &str) -> StoreResult<u64> {
        if !self.table_exists(table)? {
            return Err(StoreError::UnknownTable(table.to_string()));
        }
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Raw-log rows for one endpoint, oldest first
    pub fn raw_records(&self, endpoint: &str) -> StoreResult<Vec<RawRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT endpoint, params, retrieved_at, data FROM raw_api_data \
             WHERE endpoint = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map(params![endpoint], |row| {
                Ok(RawRecord {
                    endpoint: row.get(0)?,
                    params: row.get(1)?,
                    retrieved_at: row.get(2)?,
                    data: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
