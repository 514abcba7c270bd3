//! Point-in-time capture of aggregator state for external checkpointing.

use candela_types::Interval;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Bar;

/// Live and pending bars of a [`CandleAggregator`](crate::CandleAggregator).
///
/// The aggregator holds no durability guarantee by itself; a snapshot taken
/// periodically and restored at startup recovers in-progress buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorSnapshot {
    /// Interval the bars were built with.
    pub interval: Interval,
    /// Wall-clock time of the capture.
    pub taken_at: DateTime<Utc>,
    /// In-progress bars, sorted by symbol.
    pub live: Vec<Bar>,
    /// Finalized bars not yet drained, in emission order.
    pub pending: Vec<Bar>,
}

impl AggregatorSnapshot {
    /// Returns true if the snapshot holds no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty() && self.pending.is_empty()
    }

    /// Returns the total number of bars in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len() + self.pending.len()
    }
}

/// Errors that can occur when restoring a snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// The snapshot was built with another interval.
    #[error("Snapshot interval {found} does not match aggregator interval {expected}")]
    IntervalMismatch {
        /// The aggregator's interval.
        expected: Interval,
        /// The snapshot's interval.
        found: Interval,
    },

    /// A bar breaks the OHLC ordering or sits off the interval grid.
    #[error("Snapshot bar for {symbol} at {bucket_start} is not a valid candle")]
    InvalidBar {
        /// Symbol of the offending bar.
        symbol: String,
        /// Bucket of the offending bar.
        bucket_start: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use candela_types::Trade;
    use chrono::TimeZone;

    #[test]
    fn test_snapshot_json_roundtrip() {
        let bucket = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let bar = Bar::from_trade(&Trade::new("SPY", 470.5, 100.0, bucket), bucket);
        let snapshot = AggregatorSnapshot {
            interval: Interval::MINUTE,
            taken_at: bucket,
            live: vec![bar],
            pending: Vec::new(),
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"interval\":\"1m\""));
        assert!(json.contains("\"datetime\":\"2024-01-02T10:00:00Z\""));

        let parsed: AggregatorSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
        assert_eq!(parsed.len(), 1);
        assert!(!parsed.is_empty());
    }
}
