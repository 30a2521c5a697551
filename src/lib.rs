//! # Coinglass Ingest Library
//!
//! Pulls time-series derivatives metrics from the Coinglass REST API and
//! persists them into a local SQLite database, idempotently.
//!
//! ## Features
//!
//! - **Rate Limiting**: Minimum spacing between requests derived from a per-minute budget
//! - **Bounded Retries**: Network and HTTP status failures are retried a fixed number of times
//! - **Envelope Validation**: Application-level errors (`code != "0"`) are surfaced without retry
//! - **Typed Rows**: Open interest, funding rate, long/short ratio and liquidation records
//! - **Idempotent Store**: Duplicate natural keys are silently skipped, never overwritten
//! - **Raw Audit Log**: Any endpoint's payload can be appended verbatim for reference
//!
//! ## Quick Start
//!
//! ```no_run
//! use coinglass_ingest::config::IngestConfig;
//! use coinglass_ingest::downloader::{IngestExecutor, JobPlan};
//! use coinglass_ingest::fetcher::coinglass_http::CoinglassHttpClient;
//! use coinglass_ingest::store::Store;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IngestConfig::from_env();
//! config.validate()?;
//!
//! let client = CoinglassHttpClient::from_config(&config)?;
//! let store = Store::open(&config.db_path)?;
//! store.ensure_schema()?;
//!
//! let plan = JobPlan::from_config(&config)?;
//! let summary = IngestExecutor::new(client, store).run(&plan).await;
//! println!("{} jobs failed", summary.failed());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - Explicit run configuration and API key loading
//! - [`registry`] - Embedded catalog of named Coinglass endpoints
//! - [`fetcher`] - Request execution, envelope validation and record mapping
//! - [`downloader`] - Rate limiting, job plans and the run orchestrator
//! - [`store`] - SQLite persistence with per-table uniqueness
//! - [`output`] - CSV export of stored tables

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// CLI command implementations
pub mod cli;

/// Run configuration
pub mod config;

/// Fetch orchestration and rate limiting
pub mod downloader;

/// Request execution and record mapping
pub mod fetcher;

/// Observability metrics
pub mod metrics;

/// Data export writers
pub mod output;

/// Endpoint catalog
pub mod registry;

/// SQLite persistence
pub mod store;

/// Time interval accepted by the Coinglass history endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// 1 minute
    #[serde(rename = "1m")]
    OneMinute,
    /// 3 minutes
    #[serde(rename = "3m")]
    ThreeMinutes,
    /// 5 minutes
    #[serde(rename = "5m")]
    FiveMinutes,
    /// 15 minutes
    #[serde(rename = "15m")]
    FifteenMinutes,
    /// 30 minutes
    #[serde(rename = "30m")]
    ThirtyMinutes,
    /// 1 hour
    #[serde(rename = "1h")]
    OneHour,
    /// 4 hours
    #[serde(rename = "4h")]
    FourHours,
    /// 6 hours
    #[serde(rename = "6h")]
    SixHours,
    /// 8 hours
    #[serde(rename = "8h")]
    EightHours,
    /// 12 hours
    #[serde(rename = "12h")]
    TwelveHours,
    /// 1 day
    #[serde(rename = "1d")]
    OneDay,
    /// 1 week
    #[serde(rename = "1w")]
    OneWeek,
}

impl Interval {
    /// Convert interval to milliseconds
    pub fn to_milliseconds(&self) -> i64 {
        match self {
            Interval::OneMinute => 60_000,
            Interval::ThreeMinutes => 180_000,
            Interval::FiveMinutes => 300_000,
            Interval::FifteenMinutes => 900_000,
            Interval::ThirtyMinutes => 1_800_000,
            Interval::OneHour => 3_600_000,
            Interval::FourHours => 14_400_000,
            Interval::SixHours => 21_600_000,
            Interval::EightHours => 28_800_000,
            Interval::TwelveHours => 43_200_000,
            Interval::OneDay => 86_400_000,
            Interval::OneWeek => 604_800_000,
        }
    }

    /// Whether the Hobbyist plan accepts this interval (4h and above)
    pub fn is_hobbyist_allowed(&self) -> bool {
        self.to_milliseconds() >= Interval::FourHours.to_milliseconds()
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Interval::OneMinute => "1m",
            Interval::ThreeMinutes => "3m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::SixHours => "6h",
            Interval::EightHours => "8h",
            Interval::TwelveHours => "12h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1w",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Interval::OneMinute),
            "3m" => Ok(Interval::ThreeMinutes),
            "5m" => Ok(Interval::FiveMinutes),
            "15m" => Ok(Interval::FifteenMinutes),
            "30m" => Ok(Interval::ThirtyMinutes),
            "1h" => Ok(Interval::OneHour),
            "4h" => Ok(Interval::FourHours),
            "6h" => Ok(Interval::SixHours),
            "8h" => Ok(Interval::EightHours),
            "12h" => Ok(Interval::TwelveHours),
            "1d" => Ok(Interval::OneDay),
            "1w" => Ok(Interval::OneWeek),
            _ => Err(format!("Invalid interval: {s}")),
        }
    }
}

/// Which population a long/short ratio describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatioCategory {
    /// Top traders by account
    Top,
    /// All accounts on the exchange
    Global,
}

impl RatioCategory {
    /// Tag persisted in the `category` column
    pub fn as_str(&self) -> &'static str {
        match self {
            RatioCategory::Top => "top",
            RatioCategory::Global => "global",
        }
    }
}

impl std::fmt::Display for RatioCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatioCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(RatioCategory::Top),
            "global" => Ok(RatioCategory::Global),
            _ => Err(format!("Invalid ratio category: {s}")),
        }
    }
}

/// Persisted tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// `open_interest`, keyed by (symbol, time)
    OpenInterest,
    /// `funding_rate`, keyed by (symbol, time)
    FundingRate,
    /// `long_short_ratio`, keyed by (symbol, exchange, time, category)
    LongShortRatio,
    /// `liquidations`, keyed by (symbol, time)
    Liquidations,
    /// `raw_api_data`, append-only
    RawApiData,
}

impl Table {
    /// Every table, in schema creation order
    pub const ALL: [Table; 5] = [
        Table::OpenInterest,
        Table::FundingRate,
        Table::LongShortRatio,
        Table::Liquidations,
        Table::RawApiData,
    ];

    /// SQL table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::OpenInterest => "open_interest",
            Table::FundingRate => "funding_rate",
            Table::LongShortRatio => "long_short_ratio",
            Table::Liquidations => "liquidations",
            Table::RawApiData => "raw_api_data",
        }
    }

    /// Whether rows carry a uniqueness constraint over a natural key
    pub fn is_typed(&self) -> bool {
        !matches!(self, Table::RawApiData)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("Unknown table: {s}"))
    }
}

/// Dataset pulled by a typed fetch job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// Aggregated open interest OHLC history
    OpenInterest,
    /// Open-interest-weighted funding rate OHLC history
    FundingRate,
    /// Top trader long/short account ratio history
    TopLongShortRatio,
    /// Global long/short account ratio history
    GlobalLongShortRatio,
    /// Aggregated liquidation history
    Liquidations,
}

impl DatasetKind {
    /// Every dataset kind
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::OpenInterest,
        DatasetKind::FundingRate,
        DatasetKind::TopLongShortRatio,
        DatasetKind::GlobalLongShortRatio,
        DatasetKind::Liquidations,
    ];

    /// Table the mapped rows land in
    pub fn table(&self) -> Table {
        match self {
            DatasetKind::OpenInterest => Table::OpenInterest,
            DatasetKind::FundingRate => Table::FundingRate,
            DatasetKind::TopLongShortRatio | DatasetKind::GlobalLongShortRatio => {
                Table::LongShortRatio
            }
            DatasetKind::Liquidations => Table::Liquidations,
        }
    }

    /// Ratio category for the long/short datasets
    pub fn ratio_category(&self) -> Option<RatioCategory> {
        match self {
            DatasetKind::TopLongShortRatio => Some(RatioCategory::Top),
            DatasetKind::GlobalLongShortRatio => Some(RatioCategory::Global),
            _ => None,
        }
    }

    /// Whether requests need an `exchangeName` parameter
    pub fn requires_exchange(&self) -> bool {
        self.ratio_category().is_some()
    }

    /// Short label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::OpenInterest => "open_interest",
            DatasetKind::FundingRate => "funding_rate",
            DatasetKind::TopLongShortRatio => "top_long_short_ratio",
            DatasetKind::GlobalLongShortRatio => "global_long_short_ratio",
            DatasetKind::Liquidations => "liquidations",
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// OHLC bar shared by the open interest and funding rate tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OhlcBar {
    /// Coin symbol (e.g., "BTC")
    pub symbol: String,
    /// Bar open time (Unix timestamp in milliseconds)
    pub time: i64,
    /// Open value
    pub open: f64,
    /// High value
    pub high: f64,
    /// Low value
    pub low: f64,
    /// Close value
    pub close: f64,
}

/// Aggregated open interest bar
pub type OpenInterestBar = OhlcBar;

/// Open-interest-weighted funding rate bar
pub type FundingRateBar = OhlcBar;

/// Long/short ratio sample for one exchange and category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LongShortRatioEntry {
    /// Coin symbol
    pub symbol: String,
    /// Exchange name (e.g., "Binance")
    pub exchange: String,
    /// Sample time (Unix timestamp in milliseconds)
    pub time: i64,
    /// Long share in percent
    pub long_percent: f64,
    /// Short share in percent
    pub short_percent: f64,
    /// Long divided by short
    pub long_short_ratio: f64,
    /// Population the ratio describes
    pub category: RatioCategory,
}

/// Liquidated notional for one interval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiquidationEntry {
    /// Coin symbol
    pub symbol: String,
    /// Interval start (Unix timestamp in milliseconds)
    pub time: i64,
    /// Long liquidations in USD
    pub long_liquidation_usd: f64,
    /// Short liquidations in USD
    pub short_liquidation_usd: f64,
}

/// A typed row produced by the record mapper
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Row for `open_interest`
    OpenInterest(OpenInterestBar),
    /// Row for `funding_rate`
    FundingRate(FundingRateBar),
    /// Row for `long_short_ratio`
    LongShortRatio(LongShortRatioEntry),
    /// Row for `liquidations`
    Liquidation(LiquidationEntry),
}

impl Record {
    /// Table this row belongs to
    pub fn table(&self) -> Table {
        match self {
            Record::OpenInterest(_) => Table::OpenInterest,
            Record::FundingRate(_) => Table::FundingRate,
            Record::LongShortRatio(_) => Table::LongShortRatio,
            Record::Liquidation(_) => Table::Liquidations,
        }
    }

    /// Symbol of the row
    pub fn symbol(&self) -> &str {
        match self {
            Record::OpenInterest(bar) | Record::FundingRate(bar) => &bar.symbol,
            Record::LongShortRatio(entry) => &entry.symbol,
            Record::Liquidation(entry) => &entry.symbol,
        }
    }

    /// Timestamp of the row (milliseconds)
    pub fn time(&self) -> i64 {
        match self {
            Record::OpenInterest(bar) | Record::FundingRate(bar) => bar.time,
            Record::LongShortRatio(entry) => entry.time,
            Record::Liquidation(entry) => entry.time,
        }
    }
}

/// Raw payload row kept for any endpoint without a typed mapping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    /// Endpoint identifier (catalog name or path)
    pub endpoint: String,
    /// Query parameters serialized as JSON
    pub params: String,
    /// Retrieval time (Unix timestamp in seconds)
    pub retrieved_at: i64,
    /// Record serialized as JSON
    pub data: String,
}
