//! Streaming trade ingestion.

use std::sync::atomic::{AtomicU64, Ordering};

use candela_types::Trade;
use futures::stream::{self, Stream, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

use crate::{ParseError, parse_trade};

/// Errors that can occur while reading a trade feed.
#[derive(Error, Debug)]
pub enum FeedError {
    /// A line could not be turned into a valid trade.
    #[error("Line {line}: {source}")]
    Parse {
        /// 1-based line number in the feed.
        line: u64,
        /// What was wrong with the line.
        source: ParseError,
    },

    /// Reading the feed failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Counters for a resilient feed.
#[derive(Debug, Default)]
pub struct FeedStats {
    accepted: AtomicU64,
    skipped: AtomicU64,
}

impl FeedStats {
    /// Creates zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accepted: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    /// Returns the number of trades yielded.
    #[must_use]
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Returns the number of malformed lines skipped.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

/// Reader state carried between stream polls; `reader` is `None` once the
/// feed is done.
struct FeedState<R> {
    reader: Option<R>,
    buf: Vec<u8>,
    line_no: u64,
}

/// Strips the line terminator, accepting both `\n` and `\r\n`.
fn trim_line_end(mut line: &[u8]) -> &[u8] {
    if let Some(rest) = line.strip_suffix(b"\n") {
        line = rest;
    }
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Creates an async stream of trades from newline-delimited JSON records.
///
/// Blank lines are ignored. Each malformed line, including one that is not
/// valid UTF-8, yields an error carrying its line number; the stream ends
/// after the first I/O error.
///
/// # Arguments
///
/// * `reader` - Any buffered async reader (file, stdin, socket)
pub fn trade_stream<R>(reader: R) -> impl Stream<Item = Result<Trade, FeedError>>
where
    R: AsyncBufRead + Unpin,
{
    let state = FeedState {
        reader: Some(reader),
        buf: Vec::new(),
        line_no: 0,
    };

    stream::unfold(state, |mut state| async move {
        let reader = state.reader.as_mut()?;
        loop {
            state.buf.clear();
            match reader.read_until(b'\n', &mut state.buf).await {
                Ok(0) => return None,
                Ok(_) => {
                    state.line_no += 1;
                    let line_no = state.line_no;
                    let item = match std::str::from_utf8(trim_line_end(&state.buf)) {
                        Ok(line) if line.trim().is_empty() => continue,
                        Ok(line) => parse_trade(line),
                        Err(e) => Err(ParseError::Encoding(e)),
                    };
                    let item = item.map_err(|source| FeedError::Parse {
                        line: line_no,
                        source,
                    });
                    return Some((item, state));
                }
                Err(e) => {
                    state.reader = None;
                    return Some((Err(FeedError::Io(e)), state));
                }
            }
        }
    })
}

/// Creates a resilient stream that skips malformed lines instead of failing.
///
/// Skipped lines are logged and counted in `stats`. An I/O error ends the
/// stream.
pub fn trade_stream_resilient<'a, R>(
    reader: R,
    stats: &'a FeedStats,
) -> impl Stream<Item = Trade> + 'a
where
    R: AsyncBufRead + Unpin + 'a,
{
    trade_stream(reader).filter_map(move |item| async move {
        match item {
            Ok(trade) => {
                stats.accepted.fetch_add(1, Ordering::Relaxed);
                Some(trade)
            }
            Err(FeedError::Parse { line, source }) => {
                stats.skipped.fetch_add(1, Ordering::Relaxed);
                warn!(line, error = %source, "skipping malformed trade");
                None
            }
            Err(FeedError::Io(e)) => {
                warn!(error = %e, "trade feed read failed");
                None
            }
        }
    })
}
