//! Offline aggregation command.
//!
//! Aggregates a recorded feed with the trades' own timestamps as the clock,
//! so the output does not depend on how fast the file is read.

use crate::display::{Format, open_input, open_output};
use anyhow::{Context, Result};
use candela_daemon::{CandleSink, WriterSink};
use candela_lib::prelude::*;
use futures::StreamExt;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Folds one trade in and writes whatever it made ready.
async fn replay_trade<W: Write + Send>(
    aggregator: &CandleAggregator,
    sink: &mut WriterSink<W>,
    trade: &Trade,
) -> Result<usize> {
    aggregator.accept_trade(trade)?;
    let bars = aggregator.drain_ready(trade.timestamp);
    sink.send(&bars).await?;
    Ok(bars.len())
}

/// Replay a trade file into candles.
pub(crate) async fn replay(
    input: &Path,
    interval: Interval,
    format: Format,
    output: &Path,
    skip_invalid: bool,
) -> Result<()> {
    let reader = open_input(input).await?;
    let aggregator = CandleAggregator::new(interval);
    let mut sink = WriterSink::new(open_output(output)?, format.into());
    let mut emitted = 0;

    if skip_invalid {
        let stats = FeedStats::new();
        let mut trades = std::pin::pin!(trade_stream_resilient(reader, &stats));
        while let Some(trade) = trades.next().await {
            emitted += replay_trade(&aggregator, &mut sink, &trade).await?;
        }
        if stats.skipped() > 0 {
            warn!(skipped = stats.skipped(), "malformed lines skipped");
        }
    } else {
        let mut trades = std::pin::pin!(trade_stream(reader));
        while let Some(trade) = trades.next().await {
            let trade = trade.context("Invalid trade feed")?;
            emitted += replay_trade(&aggregator, &mut sink, &trade).await?;
        }
    }

    let rest = aggregator.finish();
    emitted += rest.len();
    sink.send(&rest).await?;
    sink.flush().await?;

    info!(%interval, emitted, "replay finished");
    Ok(())
}
