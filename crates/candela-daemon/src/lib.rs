//! Timer-driven candle flushing for candela.
//!
//! This crate runs the emission side of the aggregator:
//!
//! - [`FlushDriver`] - Drains finished bars on a timer and delivers them
//! - [`CandleSink`] - Destination for finished bars ([`ChannelSink`], [`WriterSink`], [`MemorySink`])
//! - [`StateManager`] - Persistent checkpoint storage and retrieval

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod flush;
mod sink;
mod state;

pub use flush::{FlushConfig, FlushDriver, FlushSummary};
pub use sink::{CandleSink, ChannelSink, MemorySink, SinkError, WriterSink};
pub use state::{Result, StateError, StateManager};
