//! Trade validation errors.

use thiserror::Error;

/// A trade that must not reach the aggregator.
///
/// Malformed trades are rejected, never folded into a bar.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidTradeError {
    /// The symbol is empty.
    #[error("Invalid trade: empty symbol")]
    EmptySymbol,

    /// The price is NaN or infinite.
    #[error("Invalid trade for {symbol}: non-finite price {price}")]
    NonFinitePrice {
        /// Symbol of the rejected trade.
        symbol: String,
        /// The offending price.
        price: f64,
    },

    /// The price is zero or negative.
    #[error("Invalid trade for {symbol}: price must be positive, got {price}")]
    NonPositivePrice {
        /// Symbol of the rejected trade.
        symbol: String,
        /// The offending price.
        price: f64,
    },

    /// The size is NaN, infinite, or negative.
    #[error("Invalid trade for {symbol}: size must be finite and non-negative, got {size}")]
    InvalidSize {
        /// Symbol of the rejected trade.
        symbol: String,
        /// The offending size.
        size: f64,
    },
}
