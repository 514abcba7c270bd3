//! OHLCV bar (candle) data structure.

use candela_types::Trade;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for one symbol over one bucket.
///
/// Serializes to the flat record
/// `{symbol, datetime, open, high, low, close, volume}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Instrument identifier.
    pub symbol: String,
    /// Bucket start (truncated to the interval boundary).
    #[serde(rename = "datetime")]
    pub bucket_start: DateTime<Utc>,
    /// Price of the first trade processed in the bucket.
    pub open: f64,
    /// Highest trade price in the bucket.
    pub high: f64,
    /// Lowest trade price in the bucket.
    pub low: f64,
    /// Price of the last trade processed in the bucket (arrival order).
    pub close: f64,
    /// Sum of trade sizes.
    pub volume: f64,
}

impl Bar {
    /// Opens a new bar from the first trade of a bucket.
    ///
    /// Open, high, low and close all start at the trade price.
    #[must_use]
    pub fn from_trade(trade: &Trade, bucket_start: DateTime<Utc>) -> Self {
        Self {
            symbol: trade.symbol.clone(),
            bucket_start,
            open: trade.price,
            high: trade.price,
            low: trade.price,
            close: trade.price,
            volume: trade.size,
        }
    }

    /// Folds a later trade of the same bucket into the bar.
    pub(crate) fn apply(&mut self, trade: &Trade) {
        self.high = self.high.max(trade.price);
        self.low = self.low.min(trade.price);
        self.close = trade.price;
        self.volume += trade.size;
    }

    /// Folds a bar for the same bucket that was built *before* this one.
    pub(crate) fn merge_earlier(&mut self, earlier: Self) {
        self.open = earlier.open;
        self.high = self.high.max(earlier.high);
        self.low = self.low.min(earlier.low);
        self.volume += earlier.volume;
    }

    /// Returns true if the bar could have been built from valid trades.
    ///
    /// Prices are finite and positive with `low <= open, close <= high`,
    /// and volume is finite and non-negative.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        !self.symbol.is_empty()
            && self.low.is_finite()
            && self.high.is_finite()
            && self.low > 0.0
            && self.low <= self.open
            && self.low <= self.close
            && self.open <= self.high
            && self.close <= self.high
            && self.volume.is_finite()
            && self.volume >= 0.0
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns the body size (|close - open|).
    #[must_use]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Returns true if this is a bullish (green) bar.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns true if this is a bearish (red) bar.
    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Returns the typical price ((high + low + close) / 3).
    #[must_use]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}
