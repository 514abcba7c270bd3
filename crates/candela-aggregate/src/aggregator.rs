//! Concurrent per-symbol trade-to-OHLCV aggregation.

use std::collections::HashMap;

use candela_types::{Interval, InvalidTradeError, Trade};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::{AggregatorSnapshot, Bar, SnapshotError};

/// Live and finalized bars, always mutated together under one lock.
///
/// A bar is in at most one of the two collections at any time.
#[derive(Debug, Default)]
struct BarBook {
    /// In-progress bar per symbol.
    live: HashMap<String, Bar>,
    /// Finalized bars awaiting the next drain, in emission order.
    pending: Vec<Bar>,
}

impl BarBook {
    /// Moves the live bars of `symbols` to the pending list, in the given order.
    fn finalize(&mut self, symbols: &[String]) {
        for symbol in symbols {
            if let Some(bar) = self.live.remove(symbol) {
                self.pending.push(bar);
            }
        }
    }

    /// Live symbols in a stable order.
    fn sorted_live_symbols(&self, mut keep: impl FnMut(&Bar) -> bool) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .live
            .iter()
            .filter(|(_, bar)| keep(bar))
            .map(|(symbol, _)| symbol.clone())
            .collect();
        symbols.sort_unstable();
        symbols
    }
}

/// What a single trade did to the book.
#[derive(Debug)]
enum TradeOutcome {
    Opened,
    Extended,
    RolledOver { closed: DateTime<Utc> },
}

/// Streaming multi-symbol candle aggregator.
///
/// Trades are bucketed by their truncated timestamp. A symbol's live bar is
/// finalized when a trade for any other bucket arrives (rollover) or when
/// [`drain_ready`](Self::drain_ready) observes that its bucket has elapsed
/// (expiry). Finalized bars are returned exactly once, by the next drain.
///
/// All methods take `&self`; share the aggregator between the feed and the
/// flush timer with an [`Arc`](std::sync::Arc). The lock is only held for the
/// in-memory update, never across I/O.
#[derive(Debug)]
pub struct CandleAggregator {
    interval: Interval,
    book: Mutex<BarBook>,
}

impl CandleAggregator {
    /// Creates a new aggregator for the given interval.
    #[must_use]
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            book: Mutex::new(BarBook::default()),
        }
    }

    /// Returns the interval being aggregated to.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    /// Folds one trade into its symbol's live bar.
    ///
    /// If the symbol's live bar belongs to a different bucket (earlier or
    /// later) it is finalized first and a new bar is opened from this trade.
    /// `close` follows arrival order, not timestamp order.
    ///
    /// # Errors
    ///
    /// Returns an error, without touching any bar, if the trade is malformed.
    pub fn accept_trade(&self, trade: &Trade) -> Result<(), InvalidTradeError> {
        trade.validate()?;
        let bucket = self.interval.truncate(trade.timestamp);

        let outcome = {
            let mut book = self.book.lock();
            let book = &mut *book;

            match book.live.get_mut(&trade.symbol) {
                Some(bar) if bar.bucket_start == bucket => {
                    bar.apply(trade);
                    TradeOutcome::Extended
                }
                Some(bar) => {
                    let closed = std::mem::replace(bar, Bar::from_trade(trade, bucket));
                    let closed_bucket = closed.bucket_start;
                    book.pending.push(closed);
                    TradeOutcome::RolledOver {
                        closed: closed_bucket,
                    }
                }
                None => {
                    book.live.insert(trade.symbol.clone(), Bar::from_trade(trade, bucket));
                    TradeOutcome::Opened
                }
            }
        };

        match outcome {
            TradeOutcome::Opened => {
                debug!(symbol = %trade.symbol, %bucket, price = trade.price, "opened bar");
            }
            TradeOutcome::Extended => {
                trace!(symbol = %trade.symbol, %bucket, price = trade.price, size = trade.size, "updated bar");
            }
            TradeOutcome::RolledOver { closed } => {
                debug!(symbol = %trade.symbol, %closed, opened = %bucket, "rolled over bar");
            }
        }

        Ok(())
    }

    /// Finalizes expired bars and takes every bar pending emission.
    ///
    /// A live bar expires when `bucket_start + interval < now`; a bucket whose
    /// end is past the last representable instant never expires. The returned
    /// bars are the rollover bars accumulated since the last call followed by
    /// the bars expired by this call (sorted by symbol). A `now` earlier than
    /// a bucket's end simply leaves that bar live.
    #[must_use]
    pub fn drain_ready(&self, now: DateTime<Utc>) -> Vec<Bar> {
        let interval = self.interval;

        let (bars, expired) = {
            let mut book = self.book.lock();
            let expired = book.sorted_live_symbols(|bar| {
                interval
                    .bucket_end(bar.bucket_start)
                    .is_some_and(|end| end < now)
            });
            book.finalize(&expired);
            (std::mem::take(&mut book.pending), expired.len())
        };

        if !bars.is_empty() {
            debug!(
                bars = bars.len(),
                rolled_over = bars.len() - expired,
                expired,
                %now,
                "drained bars"
            );
        }

        bars
    }

    /// Finalizes every live bar and takes everything pending.
    ///
    /// Used at end of input, when no later trade or sweep will close the
    /// remaining buckets.
    #[must_use]
    pub fn finish(&self) -> Vec<Bar> {
        let bars = {
            let mut book = self.book.lock();
            let all = book.sorted_live_symbols(|_| true);
            book.finalize(&all);
            std::mem::take(&mut book.pending)
        };

        debug!(bars = bars.len(), "finished aggregation");
        bars
    }

    /// Returns a copy of the symbol's in-progress bar, if any.
    #[must_use]
    pub fn live_bar(&self, symbol: &str) -> Option<Bar> {
        self.book.lock().live.get(symbol).cloned()
    }

    /// Returns the number of symbols with an in-progress bar.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.book.lock().live.len()
    }

    /// Returns the number of finalized bars awaiting a drain.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.book.lock().pending.len()
    }

    /// Captures the current live and pending bars without modifying them.
    #[must_use]
    pub fn snapshot(&self) -> AggregatorSnapshot {
        let book = self.book.lock();
        let mut live: Vec<Bar> = book.live.values().cloned().collect();
        live.sort_unstable_by(|a, b| a.symbol.cmp(&b.symbol));

        AggregatorSnapshot {
            interval: self.interval,
            taken_at: Utc::now(),
            live,
            pending: book.pending.clone(),
        }
    }

    /// Merges a previously captured snapshot back into the aggregator.
    ///
    /// Restored pending bars are emitted ahead of anything already pending.
    /// A restored live bar becomes the symbol's live bar if there is none;
    /// if the symbol already has a live bar for the same bucket, the restored
    /// bar is treated as its earlier part; for a different bucket the restored
    /// bar is finalized.
    ///
    /// # Errors
    ///
    /// Returns an error, without restoring anything, if the snapshot was
    /// taken with a different interval or holds a bar that is not a valid
    /// candle for this interval.
    pub fn restore(&self, snapshot: AggregatorSnapshot) -> Result<(), SnapshotError> {
        if snapshot.interval != self.interval {
            return Err(SnapshotError::IntervalMismatch {
                expected: self.interval,
                found: snapshot.interval,
            });
        }
        if let Some(bar) = snapshot.live.iter().chain(&snapshot.pending).find(|bar| {
            !bar.is_consistent() || self.interval.truncate(bar.bucket_start) != bar.bucket_start
        }) {
            return Err(SnapshotError::InvalidBar {
                symbol: bar.symbol.clone(),
                bucket_start: bar.bucket_start,
            });
        }

        let restored_live = snapshot.live.len();
        let restored_pending = snapshot.pending.len();

        {
            let mut book = self.book.lock();
            let book = &mut *book;

            let mut pending = snapshot.pending;
            for bar in snapshot.live {
                match book.live.get_mut(&bar.symbol) {
                    Some(current) if current.bucket_start == bar.bucket_start => {
                        current.merge_earlier(bar);
                    }
                    Some(_) => pending.push(bar),
                    None => {
                        book.live.insert(bar.symbol.clone(), bar);
                    }
                }
            }
            pending.append(&mut book.pending);
            book.pending = pending;
        }

        debug!(
            live = restored_live,
            pending = restored_pending,
            taken_at = %snapshot.taken_at,
            "restored snapshot"
        );
        Ok(())
    }
}

impl Default for CandleAggregator {
    fn default() -> Self {
        Self::new(Interval::default())
    }
}
