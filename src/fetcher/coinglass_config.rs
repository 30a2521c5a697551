//! Coinglass API constants
//!
//! Base URL, authentication header and the history endpoints behind each
//! typed dataset. Paths are relative to [`DEFAULT_BASE_URL`].

use crate::DatasetKind;

/// Base URL of the v4 open API
pub const DEFAULT_BASE_URL: &str = "https://open-api-v4.coinglass.com/api";

/// Header carrying the API key (header names are case-insensitive)
pub const API_KEY_HEADER: &str = "cg-api-key";

/// Envelope `code` signalling success
pub const SUCCESS_CODE: &str = "0";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "COINGLASS_API_KEY";

/// Placeholder shipped in sample configs; treated as "no key"
pub const API_KEY_PLACEHOLDER: &str = "<YOUR_COINGLASS_API_KEY>";

/// Default exchange for the long/short ratio endpoints
pub const DEFAULT_EXCHANGE: &str = "Binance";

/// Aggregated open interest OHLC history
pub const OPEN_INTEREST_ENDPOINT: &str = "/futures/open-interest/aggregated-history";

/// OI-weighted funding rate OHLC history
pub const FUNDING_RATE_ENDPOINT: &str = "/futures/funding-rate/oi-weight-history";

/// Top trader long/short account ratio history
pub const TOP_LONG_SHORT_ENDPOINT: &str = "/futures/top-long-short-account-ratio/history";

/// Global long/short account ratio history
pub const GLOBAL_LONG_SHORT_ENDPOINT: &str = "/futures/global-long-short-account-ratio/history";

/// Aggregated liquidation history
pub const LIQUIDATION_ENDPOINT: &str = "/futures/liquidation/aggregated-history";

/// History endpoint serving a dataset
pub fn dataset_endpoint(kind: DatasetKind) -> &'static str {
    match kind {
        DatasetKind::OpenInterest => OPEN_INTEREST_ENDPOINT,
        DatasetKind::FundingRate => FUNDING_RATE_ENDPOINT,
        DatasetKind::TopLongShortRatio => TOP_LONG_SHORT_ENDPOINT,
        DatasetKind::GlobalLongShortRatio => GLOBAL_LONG_SHORT_ENDPOINT,
        DatasetKind::Liquidations => LIQUIDATION_ENDPOINT,
    }
}
