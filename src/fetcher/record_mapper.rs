//! Coinglass record mapper
//!
//! Stateless conversion of payload objects into typed [`Record`]s. Field
//! names that differ between sibling endpoints are resolved through explicit
//! [`FieldPriority`] lists evaluated in order.

use serde_json::Value;

use crate::fetcher::{FetcherError, FetcherResult};
use crate::{DatasetKind, LiquidationEntry, LongShortRatioEntry, OhlcBar, Record};

/// Ordered candidate fields for one numeric value, with a default
#[derive(Debug, Clone, Copy)]
pub struct FieldPriority {
    /// Candidate keys, highest priority first
    pub fields: &'static [&'static str],
    /// Value when no candidate is present
    pub default: f64,
}

impl FieldPriority {
    /// Resolve the first present candidate.
    ///
    /// Absent or `null` keys fall through to the next candidate. A present
    /// value that is not numeric is a `MalformedRecord`.
    pub fn resolve(&self, record: &Value) -> FetcherResult<f64> {
        for field in self.fields {
            match record.get(*field) {
                None | Some(Value::Null) => continue,
                Some(value) => return parse_number(value, field),
            }
        }
        Ok(self.default)
    }
}

/// Long share: top trader account ratio first, then global account ratio
pub const LONG_PERCENT: FieldPriority = FieldPriority {
    fields: &["top_account_long_percent", "global_account_long_percent"],
    default: 0.0,
};

/// Short share, same precedence as [`LONG_PERCENT`]
pub const SHORT_PERCENT: FieldPriority = FieldPriority {
    fields: &["top_account_short_percent", "global_account_short_percent"],
    default: 0.0,
};

/// Long/short ratio, same precedence as [`LONG_PERCENT`]
pub const LONG_SHORT_RATIO: FieldPriority = FieldPriority {
    fields: &["top_account_long_short_ratio", "global_account_long_short_ratio"],
    default: 0.0,
};

/// Long liquidations: aggregated history first, then per-exchange history
pub const LONG_LIQUIDATION_USD: FieldPriority = FieldPriority {
    fields: &["aggregated_long_liquidation_usd", "long_liquidation_usd"],
    default: 0.0,
};

/// Short liquidations, same precedence as [`LONG_LIQUIDATION_USD`]
pub const SHORT_LIQUIDATION_USD: FieldPriority = FieldPriority {
    fields: &["aggregated_short_liquidation_usd", "short_liquidation_usd"],
    default: 0.0,
};

const OPEN: FieldPriority = FieldPriority {
    fields: &["open"],
    default: 0.0,
};
const HIGH: FieldPriority = FieldPriority {
    fields: &["high"],
    default: 0.0,
};
const LOW: FieldPriority = FieldPriority {
    fields: &["low"],
    default: 0.0,
};
const CLOSE: FieldPriority = FieldPriority {
    fields: &["close"],
    default: 0.0,
};

/// Job-level values that payload records usually omit
#[derive(Debug, Clone, Copy)]
pub struct MappingContext<'a> {
    /// Symbol the job requested
    pub symbol: &'a str,
    /// Exchange the job requested (ratio datasets)
    pub exchange: Option<&'a str>,
}

impl<'a> MappingContext<'a> {
    /// Context for a symbol-only dataset
    pub fn new(symbol: &'a str) -> Self {
        Self {
            symbol,
            exchange: None,
        }
    }

    /// Attach an exchange
    pub fn with_exchange(mut self, exchange: &'a str) -> Self {
        self.exchange = Some(exchange);
        self
    }
}

/// Stateless mapper from payload objects to typed rows
pub struct RecordMapper;

impl RecordMapper {
    /// Map one payload object.
    ///
    /// # Errors
    /// `MalformedRecord` when the symbol or `time` is missing, when a ratio
    /// record has no exchange, or when a present numeric field is unreadable.
    /// Missing numeric fields default to 0.
    pub fn map(kind: DatasetKind, ctx: &MappingContext<'_>, record: &Value) -> FetcherResult<Record> {
        if !record.is_object() {
            return Err(FetcherError::MalformedRecord(format!(
                "{kind} record is not an object"
            )));
        }

        let symbol = Self::symbol(ctx, record)?;
        let time = Self::timestamp(record)?;

        let mapped = match kind {
            DatasetKind::OpenInterest => Record::OpenInterest(Self::ohlc(symbol, time, record)?),
            DatasetKind::FundingRate => Record::FundingRate(Self::ohlc(symbol, time, record)?),
            DatasetKind::TopLongShortRatio | DatasetKind::GlobalLongShortRatio => {
                let exchange = ctx
                    .exchange
                    .map(str::to_string)
                    .or_else(|| string_field(record, "exchange_name"))
                    .ok_or_else(|| {
                        FetcherError::MalformedRecord("missing exchange for ratio record".to_string())
                    })?;
                let category = kind.ratio_category().ok_or_else(|| {
                    FetcherError::MalformedRecord(format!("{kind} has no ratio category"))
                })?;

                Record::LongShortRatio(LongShortRatioEntry {
                    symbol,
                    exchange,
                    time,
                    long_percent: LONG_PERCENT.resolve(record)?,
                    short_percent: SHORT_PERCENT.resolve(record)?,
                    long_short_ratio: LONG_SHORT_RATIO.resolve(record)?,
                    category,
                })
            }
            DatasetKind::Liquidations => Record::Liquidation(LiquidationEntry {
                symbol,
                time,
                long_liquidation_usd: LONG_LIQUIDATION_USD.resolve(record)?,
                short_liquidation_usd: SHORT_LIQUIDATION_USD.resolve(record)?,
            }),
        };

        Ok(mapped)
    }

    /// Map a whole payload; the first malformed record fails the batch
    pub fn map_all(
        kind: DatasetKind,
        ctx: &MappingContext<'_>,
        records: &[Value],
    ) -> FetcherResult<Vec<Record>> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                Self::map(kind, ctx, record).map_err(|e| match e {
                    FetcherError::MalformedRecord(msg) => {
                        FetcherError::MalformedRecord(format!("record {index}: {msg}"))
                    }
                    other => other,
                })
            })
            .collect()
    }

    fn ohlc(symbol: String, time: i64, record: &Value) -> FetcherResult<OhlcBar> {
        Ok(OhlcBar {
            symbol,
            time,
            open: OPEN.resolve(record)?,
            high: HIGH.resolve(record)?,
            low: LOW.resolve(record)?,
            close: CLOSE.resolve(record)?,
        })
    }

    /// Job symbol keys the row; the record's own `symbol` is the fallback
    fn symbol(ctx: &MappingContext<'_>, record: &Value) -> FetcherResult<String> {
        let requested = ctx.symbol.trim();
        if !requested.is_empty() {
            return Ok(requested.to_string());
        }
        string_field(record, "symbol")
            .ok_or_else(|| FetcherError::MalformedRecord("missing symbol".to_string()))
    }

    fn timestamp(record: &Value) -> FetcherResult<i64> {
        let value = match record.get("time") {
            None | Some(Value::Null) => {
                return Err(FetcherError::MalformedRecord("missing time".to_string()))
            }
            Some(value) => value,
        };

        if let Some(ms) = value.as_i64() {
            return Ok(ms);
        }
        if let Some(s) = value.as_str() {
            if let Ok(ms) = s.trim().parse::<i64>() {
                return Ok(ms);
            }
        }
        // 2^63 is exact in f64; anything at or above it overflows i64
        let float = parse_number(value, "time")?;
        if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 {
            Ok(float as i64)
        } else {
            Err(FetcherError::MalformedRecord(format!(
                "time is not a millisecond timestamp: {value}"
            )))
        }
    }
}

fn string_field(record: &Value, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Numbers arrive as JSON numbers or numeric strings
fn parse_number(value: &Value, field_name: &str) -> FetcherResult<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            FetcherError::MalformedRecord(format!("{field_name} is out of range: {n}"))
        })?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|e| {
            FetcherError::MalformedRecord(format!("Failed to parse {field_name} '{s}': {e}"))
        })?,
        other => {
            return Err(FetcherError::MalformedRecord(format!(
                "{field_name} is not numeric: {other}"
            )))
        }
    };

    // `f64::from_str` accepts "NaN" and "inf"
    if number.is_finite() {
        Ok(number)
    } else {
        Err(FetcherError::MalformedRecord(format!(
            "{field_name} is not finite: {value}"
        )))
    }
}
