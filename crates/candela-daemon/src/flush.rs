//! Timer-driven draining of finished candles into a sink.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use candela_aggregate::{Bar, CandleAggregator};
use candela_types::Interval;
use chrono::{DateTime, Utc};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{CandleSink, SinkError, StateManager};

/// Flush driver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushConfig {
    /// Time between drains.
    pub cadence: Duration,
    /// Finalize and emit every live bar on shutdown.
    pub flush_on_shutdown: bool,
    /// Save a checkpoint every N ticks, if a state manager is attached.
    pub checkpoint_every: Option<u32>,
}

impl FlushConfig {
    /// Creates a configuration that drains once per interval.
    #[must_use]
    pub const fn for_interval(interval: Interval) -> Self {
        Self {
            cadence: interval.as_duration(),
            flush_on_shutdown: false,
            checkpoint_every: None,
        }
    }

    /// Sets the time between drains.
    #[must_use]
    pub const fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    /// Sets whether live bars are emitted on shutdown.
    #[must_use]
    pub const fn with_flush_on_shutdown(mut self, flush_on_shutdown: bool) -> Self {
        self.flush_on_shutdown = flush_on_shutdown;
        self
    }

    /// Sets how many ticks pass between checkpoints.
    #[must_use]
    pub const fn with_checkpoint_every(mut self, ticks: Option<u32>) -> Self {
        self.checkpoint_every = ticks;
        self
    }
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self::for_interval(Interval::default())
    }
}

/// Totals reported when a [`FlushDriver`] stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushSummary {
    /// Timer ticks handled.
    pub ticks: u64,
    /// Bars delivered to the sink.
    pub emitted: u64,
    /// Bars the sink never accepted.
    pub undelivered: usize,
}

/// Periodically drains an aggregator into a [`CandleSink`].
///
/// The aggregator lock is only held inside `drain_ready`; sink I/O happens
/// afterwards. Bars a sink rejects are kept and re-sent ahead of newer bars.
#[derive(Debug)]
pub struct FlushDriver<S> {
    aggregator: Arc<CandleAggregator>,
    sink: S,
    config: FlushConfig,
    backlog: Vec<Bar>,
    state: Option<StateManager>,
    ticks: u64,
    emitted: u64,
}

impl<S: CandleSink> FlushDriver<S> {
    /// Creates a driver for a shared aggregator.
    #[must_use]
    pub const fn new(aggregator: Arc<CandleAggregator>, sink: S, config: FlushConfig) -> Self {
        Self {
            aggregator,
            sink,
            config,
            backlog: Vec::new(),
            state: None,
            ticks: 0,
            emitted: 0,
        }
    }

    /// Attaches a state manager for checkpoints.
    #[must_use]
    pub fn with_state_manager(mut self, state: StateManager) -> Self {
        self.state = Some(state);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &FlushConfig {
        &self.config
    }

    /// Returns the bars waiting for redelivery.
    #[must_use]
    pub fn backlog(&self) -> &[Bar] {
        &self.backlog
    }

    /// Returns the sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the driver, returning the sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Drains bars that are ready at `now` and sends them with any backlog.
    ///
    /// Returns the number of bars delivered.
    ///
    /// # Errors
    ///
    /// Returns the sink error; the undelivered bars stay in the backlog.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<usize, SinkError> {
        self.ticks += 1;
        let ready = self.aggregator.drain_ready(now);
        self.backlog.extend(ready);
        self.deliver().await
    }

    async fn deliver(&mut self) -> Result<usize, SinkError> {
        if self.backlog.is_empty() {
            return Ok(0);
        }

        self.sink.send(&self.backlog).await?;
        let delivered = self.backlog.len();
        self.backlog.clear();
        self.emitted += delivered as u64;
        debug!(delivered, "flushed bars");
        Ok(delivered)
    }

    /// Saves live, pending and backlog bars through the state manager.
    ///
    /// Does nothing without a state manager. Failures are logged.
    pub fn checkpoint(&self) {
        let Some(state) = &self.state else {
            return;
        };

        let mut snapshot = self.aggregator.snapshot();
        if !self.backlog.is_empty() {
            let mut pending = self.backlog.clone();
            pending.append(&mut snapshot.pending);
            snapshot.pending = pending;
        }

        match state.save_checkpoint(&snapshot) {
            Ok(()) => debug!(bars = snapshot.len(), "checkpoint saved"),
            Err(e) => warn!(error = %e, "checkpoint failed"),
        }
    }

    /// Runs the drain loop until `shutdown` resolves.
    ///
    /// On shutdown the driver drains once more, finalizes every live bar if
    /// `flush_on_shutdown` is set, and sends what is left. With a state
    /// manager attached, remaining bars are checkpointed, or the checkpoint is
    /// cleared when nothing remains.
    pub async fn run<F>(&mut self, shutdown: F) -> FlushSummary
    where
        F: Future<Output = ()>,
    {
        let cadence = self.config.cadence;
        let mut timer = time::interval_at(Instant::now() + cadence, cadence);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(cadence_ms = cadence.as_millis() as u64, "flush driver started");

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = timer.tick() => {
                    if let Err(e) = self.tick(Utc::now()).await {
                        warn!(error = %e, backlog = self.backlog.len(), "sink rejected bars");
                    }
                    if let Some(every) = self.config.checkpoint_every
                        && every > 0
                        && self.ticks % u64::from(every) == 0
                    {
                        self.checkpoint();
                    }
                }
            }
        }

        self.shutdown().await
    }

    async fn shutdown(&mut self) -> FlushSummary {
        let ready = self.aggregator.drain_ready(Utc::now());
        self.backlog.extend(ready);
        if self.config.flush_on_shutdown {
            let rest = self.aggregator.finish();
            self.backlog.extend(rest);
        }

        if let Err(e) = self.deliver().await {
            warn!(error = %e, undelivered = self.backlog.len(), "final flush failed");
        }
        if let Err(e) = self.sink.flush().await {
            warn!(error = %e, "sink flush failed");
        }

        if let Some(state) = &self.state {
            if self.backlog.is_empty() && self.aggregator.live_count() == 0 {
                match state.clear_checkpoint() {
                    Ok(true) => debug!("checkpoint cleared"),
                    Ok(false) => {}
                    Err(e) => warn!(error = %e, "could not clear checkpoint"),
                }
            } else {
                self.checkpoint();
            }
        }

        let summary = FlushSummary {
            ticks: self.ticks,
            emitted: self.emitted,
            undelivered: self.backlog.len(),
        };
        info!(
            ticks = summary.ticks,
            emitted = summary.emitted,
            undelivered = summary.undelivered,
            live = self.aggregator.live_count(),
            "flush driver stopped"
        );
        summary
    }
}
