//! Core types for the candela trade-to-candle aggregator.
//!
//! This crate provides the fundamental data structures used throughout candela:
//!
//! - [`Trade`] - A single executed trade with symbol, price, size, and timestamp
//! - [`Interval`] - Candle width and bucket truncation
//! - [`InvalidTradeError`] - Why a trade was rejected at the boundary

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/candela/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod interval;
mod trade;

pub use error::InvalidTradeError;
pub use interval::{Interval, IntervalParseError};
pub use trade::Trade;
