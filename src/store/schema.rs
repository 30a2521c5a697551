//! Table definitions
//!
//! Typed tables carry a primary key over their natural key so that
//! `INSERT OR IGNORE` turns duplicates into no-ops. `raw_api_data` has no key.

use crate::Table;

/// DDL for every table, in [`Table::ALL`] order
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS open_interest (
    symbol TEXT,
    time   INTEGER,
    open   REAL,
    high   REAL,
    low    REAL,
    close  REAL,
    PRIMARY KEY(symbol, time)
);

CREATE TABLE IF NOT EXISTS funding_rate (
    symbol TEXT,
    time   INTEGER,
    open   REAL,
    high   REAL,
    low    REAL,
    close  REAL,
    PRIMARY KEY(symbol, time)
);

CREATE TABLE IF NOT EXISTS long_short_ratio (
    symbol           TEXT,
    exchange         TEXT,
    time             INTEGER,
    long_percent     REAL,
    short_percent    REAL,
    long_short_ratio REAL,
    category         TEXT,
    PRIMARY KEY(symbol, exchange, time, category)
);

CREATE TABLE IF NOT EXISTS liquidations (
    symbol                TEXT,
    time                  INTEGER,
    long_liquidation_usd  REAL,
    short_liquidation_usd REAL,
    PRIMARY KEY(symbol, time)
);

CREATE TABLE IF NOT EXISTS raw_api_data (
    endpoint     TEXT,
    params       TEXT,
    retrieved_at INTEGER,
    data         TEXT
);
"#;

/// Insert statement for a typed table; `None` for the raw log
pub fn insert_statement(table: Table) -> Option<&'static str> {
    match table {
        Table::OpenInterest => Some(
            "INSERT OR IGNORE INTO open_interest (symbol, time, open, high, low, close)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        ),
        Table::FundingRate => Some(
            "INSERT OR IGNORE INTO funding_rate (symbol, time, open, high, low, close)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        ),
        Table::LongShortRatio => Some(
            "INSERT OR IGNORE INTO long_short_ratio
                 (symbol, exchange, time, long_percent, short_percent, long_short_ratio, category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        ),
        Table::Liquidations => Some(
            "INSERT OR IGNORE INTO liquidations
                 (symbol, time, long_liquidation_usd, short_liquidation_usd)
             VALUES (?1, ?2, ?3, ?4)",
        ),
        Table::RawApiData => None,
    }
}

/// Append statement for the raw log
pub const INSERT_RAW: &str =
    "INSERT INTO raw_api_data (endpoint, params, retrieved_at, data) VALUES (?1, ?2, ?3, ?4)";
