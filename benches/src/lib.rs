//! Shared fixtures for candela benchmarks.

use candela_aggregate::{Bar, CandleAggregator};
use candela_types::Trade;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

/// Shape of a synthetic trade feed.
#[derive(Debug, Clone, Copy)]
pub struct FeedConfig {
    /// Number of distinct symbols, traded round-robin.
    pub symbols: usize,
    /// Total number of trades.
    pub trades: usize,
    /// Milliseconds between consecutive trades.
    pub step_ms: i64,
}

/// Start of every synthetic feed.
#[must_use]
pub fn feed_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0)
        .single()
        .unwrap_or_default()
}

/// Generates a deterministic trade feed with a slow price walk per symbol.
///
/// A config with zero symbols still trades one. Timestamps that would leave
/// chrono's range are clamped to the last representable offset.
#[must_use]
pub fn synthetic_trades(config: FeedConfig) -> Vec<Trade> {
    let start = feed_start();
    let symbols: Vec<String> = (0..config.symbols.max(1))
        .map(|i| format!("SYM{i:03}"))
        .collect();

    (0..config.trades)
        .map(|i| {
            let symbol = &symbols[i % symbols.len()];
            let wave = ((i / symbols.len()) % 200) as f64;
            let price = 100.0 + (wave - 100.0).abs() * 0.01;
            let size = (i % 7 + 1) as f64;
            let offset_ms = i64::try_from(i)
                .unwrap_or(i64::MAX)
                .saturating_mul(config.step_ms);
            let ts = TimeDelta::try_milliseconds(offset_ms)
                .and_then(|offset| start.checked_add_signed(offset))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            Trade::new(symbol.as_str(), price, size, ts)
        })
        .collect()
}

/// Feeds every trade, draining on the trades' clock, and returns all bars.
#[must_use]
pub fn replay(aggregator: &CandleAggregator, trades: &[Trade]) -> Vec<Bar> {
    let mut bars = Vec::new();
    for trade in trades {
        if aggregator.accept_trade(trade).is_ok() {
            bars.extend(aggregator.drain_ready(trade.timestamp));
        }
    }
    bars.extend(aggregator.finish());
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use candela_types::Interval;

    #[test]
    fn test_zero_symbols_still_generates_trades() {
        let trades = synthetic_trades(FeedConfig {
            symbols: 0,
            trades: 3,
            step_ms: 1_000,
        });

        assert_eq!(trades.len(), 3);
        assert!(trades.iter().all(|t| t.symbol == "SYM000"));
        assert_eq!(trades[2].timestamp, feed_start() + TimeDelta::seconds(2));
    }

    #[test]
    fn test_huge_step_clamps_timestamps() {
        let trades = synthetic_trades(FeedConfig {
            symbols: 2,
            trades: 3,
            step_ms: i64::MAX,
        });

        assert_eq!(trades[0].timestamp, feed_start());
        assert_eq!(trades[2].timestamp, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_replay_conserves_volume() {
        let trades = synthetic_trades(FeedConfig {
            symbols: 4,
            trades: 500,
            step_ms: 250,
        });
        let aggregator = CandleAggregator::new(Interval::MINUTE);
        let bars = replay(&aggregator, &trades);

        let traded: f64 = trades.iter().map(|t| t.size).sum();
        let emitted: f64 = bars.iter().map(|b| b.volume).sum();
        assert!((traded - emitted).abs() < 1e-9);
    }
}
