//! Trade representation.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::InvalidTradeError;

/// A single executed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Instrument identifier (e.g. `AAPL`).
    pub symbol: String,
    /// Execution price.
    pub price: f64,
    /// Executed quantity.
    pub size: f64,
    /// Execution time (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    /// Creates a new trade.
    ///
    /// The timestamp may carry any timezone; it is converted to UTC.
    #[must_use]
    pub fn new<Tz: TimeZone>(
        symbol: impl Into<String>,
        price: f64,
        size: f64,
        timestamp: DateTime<Tz>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            size,
            timestamp: timestamp.with_timezone(&Utc),
        }
    }

    /// Checks the trade against the aggregator's input contract.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is empty, the price is not a finite
    /// positive number, or the size is not a finite non-negative number.
    pub fn validate(&self) -> Result<(), InvalidTradeError> {
        if self.symbol.is_empty() {
            return Err(InvalidTradeError::EmptySymbol);
        }
        if !self.price.is_finite() {
            return Err(InvalidTradeError::NonFinitePrice {
                symbol: self.symbol.clone(),
                price: self.price,
            });
        }
        if self.price <= 0.0 {
            return Err(InvalidTradeError::NonPositivePrice {
                symbol: self.symbol.clone(),
                price: self.price,
            });
        }
        if !self.size.is_finite() || self.size < 0.0 {
            return Err(InvalidTradeError::InvalidSize {
                symbol: self.symbol.clone(),
                size: self.size,
            });
        }
        Ok(())
    }

    /// Returns the traded notional (price * size).
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.price * self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn trade(price: f64, size: f64) -> Trade {
        Trade::new("AAPL", price, size, Utc::now())
    }

    #[test]
    fn test_timestamp_converted_to_utc() {
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        let local = est.with_ymd_and_hms(2024, 1, 2, 5, 0, 5).unwrap();
        let trade = Trade::new("AAPL", 100.0, 1.0, local);

        assert_eq!(
            trade.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 5).unwrap()
        );
    }

    #[test]
    fn test_valid_trade() {
        assert!(trade(100.0, 10.0).validate().is_ok());
        assert!(trade(0.01, 0.0).validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_price() {
        assert!(matches!(
            trade(f64::NAN, 1.0).validate(),
            Err(InvalidTradeError::NonFinitePrice { .. })
        ));
        assert!(matches!(
            trade(f64::INFINITY, 1.0).validate(),
            Err(InvalidTradeError::NonFinitePrice { .. })
        ));
        assert!(matches!(
            trade(0.0, 1.0).validate(),
            Err(InvalidTradeError::NonPositivePrice { .. })
        ));
        assert!(matches!(
            trade(-5.0, 1.0).validate(),
            Err(InvalidTradeError::NonPositivePrice { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_size() {
        assert!(matches!(
            trade(100.0, -1.0).validate(),
            Err(InvalidTradeError::InvalidSize { .. })
        ));
        assert!(matches!(
            trade(100.0, f64::NAN).validate(),
            Err(InvalidTradeError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_symbol() {
        let trade = Trade::new("", 100.0, 1.0, Utc::now());
        assert_eq!(trade.validate(), Err(InvalidTradeError::EmptySymbol));
    }

    #[test]
    fn test_notional() {
        assert!((trade(101.5, 20.0).notional() - 2030.0).abs() < 1e-10);
    }
}
