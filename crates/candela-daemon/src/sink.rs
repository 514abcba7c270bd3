//! Destinations for finished candles.

use async_trait::async_trait;
use candela_aggregate::Bar;
use candela_format::{BarWriter, FormatError, OutputFormat};
use std::io::Write;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur while handing bars to a sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The receiving side has gone away.
    #[error("Sink closed")]
    Closed,

    /// Formatting or writing failed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Receives finished bars from the flush driver.
///
/// A sink that returns an error gets the same bars again, together with any
/// newer ones, on the next flush.
#[async_trait]
pub trait CandleSink: Send {
    /// Delivers a batch of bars, in emission order.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch was not delivered.
    async fn send(&mut self, bars: &[Bar]) -> Result<(), SinkError>;

    /// Flushes buffered output, called once on shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered output cannot be written.
    async fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Forwards bars one by one into a tokio channel.
///
/// This is the in-process queue between aggregation and persistence.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Bar>,
}

impl ChannelSink {
    /// Wraps the sending half of a channel.
    #[must_use]
    pub const fn new(tx: mpsc::Sender<Bar>) -> Self {
        Self { tx }
    }

    /// Creates a bounded channel and returns the sink with its receiver.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Bar>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl CandleSink for ChannelSink {
    async fn send(&mut self, bars: &[Bar]) -> Result<(), SinkError> {
        for bar in bars {
            self.tx
                .send(bar.clone())
                .await
                .map_err(|_| SinkError::Closed)?;
        }
        Ok(())
    }
}

/// Writes bars to any [`Write`] in one of the output formats.
///
/// Batches join into one stream: CSV gets a single header and a JSON array
/// is closed by [`flush`](CandleSink::flush), which the flush driver calls
/// once on shutdown.
#[derive(Debug)]
pub struct WriterSink<W> {
    output: BarWriter<W>,
}

impl<W: Write + Send> WriterSink<W> {
    /// Creates a sink writing `format` to `writer`.
    #[must_use]
    pub const fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            output: BarWriter::new(writer, format),
        }
    }

    /// Returns the output format.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.output.format()
    }

    /// Consumes the sink, returning the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.output.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send> CandleSink for WriterSink<W> {
    async fn send(&mut self, bars: &[Bar]) -> Result<(), SinkError> {
        self.output.write_batch(bars)?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.output.finish()?;
        Ok(())
    }
}

/// Collects bars in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    bars: Vec<Bar>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self { bars: Vec::new() }
    }

    /// Returns the bars received so far.
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Consumes the sink, returning the bars received.
    #[must_use]
    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

#[async_trait]
impl CandleSink for MemorySink {
    async fn send(&mut self, bars: &[Bar]) -> Result<(), SinkError> {
        self.bars.extend_from_slice(bars);
        Ok(())
    }
}
