//! Live aggregation command.
//!
//! Reads trades as they arrive and emits candles on a timer until the feed
//! ends or Ctrl-C is pressed.

use crate::display::{Format, open_input, open_output, state_manager};
use anyhow::{Context, Result, bail};
use candela_daemon::{FlushConfig, FlushDriver, WriterSink};
use candela_lib::prelude::*;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Run the live aggregator.
///
/// `checkpoint` is `Some` when checkpointing is enabled, holding the optional
/// state directory.
pub(crate) async fn run(
    input: &Path,
    interval: Interval,
    format: Format,
    output: &Path,
    cadence: Option<u64>,
    flush_on_exit: bool,
    checkpoint: Option<Option<PathBuf>>,
) -> Result<()> {
    let aggregator = Arc::new(CandleAggregator::new(interval));

    let state = checkpoint.map(state_manager).transpose()?;
    if let Some(state) = &state
        && let Some(snapshot) = state.load_checkpoint()?
    {
        let restored = snapshot.len();
        aggregator
            .restore(snapshot)
            .with_context(|| format!("Cannot resume from {}", state.checkpoint_path().display()))?;
        info!(bars = restored, "resumed from checkpoint");
    }

    let mut config = FlushConfig::for_interval(interval)
        .with_flush_on_shutdown(flush_on_exit)
        .with_checkpoint_every(state.as_ref().map(|_| 1));
    if let Some(secs) = cadence {
        if secs == 0 {
            bail!("Cadence must be at least one second");
        }
        config = config.with_cadence(Duration::from_secs(secs));
    }

    let sink = WriterSink::new(open_output(output)?, format.into());
    let mut driver = FlushDriver::new(aggregator.clone(), sink, config);
    if let Some(state) = state {
        driver = driver.with_state_manager(state);
    }

    let reader = open_input(input).await?;
    let stats = Arc::new(FeedStats::new());
    let mut feed = tokio::spawn({
        let aggregator = aggregator.clone();
        let stats = stats.clone();
        async move {
            let mut trades = std::pin::pin!(trade_stream_resilient(reader, &stats));
            while let Some(trade) = trades.next().await {
                if let Err(e) = aggregator.accept_trade(&trade) {
                    warn!(error = %e, "trade rejected");
                }
            }
        }
    });

    info!(%interval, format = %format, "aggregating trades");

    let summary = driver
        .run(async {
            tokio::select! {
                result = tokio::signal::ctrl_c() => match result {
                    Ok(()) => info!("interrupted, shutting down"),
                    Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
                },
                _ = &mut feed => info!("trade feed ended"),
            }
        })
        .await;
    feed.abort();

    info!(
        accepted = stats.accepted(),
        skipped = stats.skipped(),
        emitted = summary.emitted,
        "done"
    );

    if summary.undelivered > 0 {
        bail!("{} candles could not be written", summary.undelivered);
    }

    Ok(())
}
