//! Streaming trade-to-OHLCV candle aggregation.
//!
//! This is a facade crate that re-exports functionality from the candela
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use candela_lib::prelude::*;
//! use futures::StreamExt;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let aggregator = Arc::new(CandleAggregator::new("1m".parse()?));
//!     let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//!
//!     let mut trades = std::pin::pin!(trade_stream(stdin));
//!     while let Some(trade) = trades.next().await {
//!         let trade = trade?;
//!         aggregator.accept_trade(&trade)?;
//!         for bar in aggregator.drain_ready(trade.timestamp) {
//!             println!("{}", serde_json::to_string(&bar)?);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use candela_types::*;

// Re-export aggregation
#[cfg(feature = "aggregate")]
pub use candela_aggregate::{AggregatorSnapshot, Bar, CandleAggregator, SnapshotError};

// Re-export feed parsing
#[cfg(feature = "feed")]
pub use candela_feed::{
    FeedError, FeedStats, ParseError, parse_trade, trade_stream, trade_stream_resilient,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use candela_format::{CsvFormatter, FormatError, Formatter, JsonFormatter, OutputFormat};

// Re-export flushing and checkpoints
#[cfg(feature = "daemon")]
pub use candela_daemon::{
    CandleSink, ChannelSink, FlushConfig, FlushDriver, FlushSummary, MemorySink, SinkError,
    StateError, StateManager, WriterSink,
};

/// Prelude module for convenient imports.
///
/// ```
/// use candela_lib::prelude::*;
/// ```
pub mod prelude {
    pub use candela_types::{Interval, IntervalParseError, InvalidTradeError, Trade};

    #[cfg(feature = "aggregate")]
    pub use candela_aggregate::{Bar, CandleAggregator};

    #[cfg(feature = "feed")]
    pub use candela_feed::{FeedStats, trade_stream, trade_stream_resilient};

    #[cfg(feature = "format")]
    pub use candela_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(feature = "daemon")]
    pub use candela_daemon::{CandleSink, FlushConfig, FlushDriver, StateManager, WriterSink};
}
