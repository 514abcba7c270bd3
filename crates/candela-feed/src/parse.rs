//! Trade record parsing from NDJSON lines.

use candela_types::{InvalidTradeError, Trade};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur during trade parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The line is not a trade record.
    #[error("Malformed trade record: {0}")]
    Json(#[from] serde_json::Error),

    /// The line is not valid UTF-8.
    #[error("Line is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// The record parsed but violates the trade contract.
    #[error(transparent)]
    Invalid(#[from] InvalidTradeError),
}

/// Wire shape of a trade record.
///
/// The timestamp may carry any UTC offset.
#[derive(Debug, Deserialize)]
struct TradeRecord {
    #[serde(alias = "S")]
    symbol: String,
    #[serde(alias = "p")]
    price: f64,
    #[serde(alias = "s")]
    size: f64,
    #[serde(alias = "t")]
    timestamp: DateTime<FixedOffset>,
}

/// Parses and validates a single trade record.
///
/// # Errors
///
/// Returns an error if the line is not valid JSON, misses a field, carries an
/// unparsable timestamp, or describes a malformed trade.
pub fn parse_trade(line: &str) -> Result<Trade, ParseError> {
    let record: TradeRecord = serde_json::from_str(line)?;
    let trade = Trade::new(record.symbol, record.price, record.size, record.timestamp);
    trade.validate()?;
    Ok(trade)
}
