//! Concurrent per-symbol OHLCV candle aggregation for candela.
//!
//! This crate provides trade-to-OHLCV (candlestick) aggregation:
//!
//! - [`Bar`] - OHLCV bar for one symbol and one bucket
//! - [`CandleAggregator`] - Thread-safe streaming aggregator with rollover and expiry
//! - [`AggregatorSnapshot`] - Captured aggregator state for checkpointing

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod bar;
mod snapshot;

pub use aggregator::CandleAggregator;
pub use bar::Bar;
pub use snapshot::{AggregatorSnapshot, SnapshotError};
