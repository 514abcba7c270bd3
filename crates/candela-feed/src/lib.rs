//! Trade feed parsing and streaming for candela.
//!
//! This crate provides the trade ingestion boundary:
//!
//! - [`parse::parse_trade`] - Parses and validates one NDJSON trade record
//! - [`trade_stream`] - Async stream of trades from any buffered reader
//! - [`trade_stream_resilient`] - Same, skipping malformed records

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod parse;
mod stream;

pub use parse::{ParseError, parse_trade};
pub use stream::{FeedError, FeedStats, trade_stream, trade_stream_resilient};
