//! JSON output format.

use candela_aggregate::Bar;
use std::io::Write;

use crate::{FormatError, Formatter};

/// JSON output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// A single JSON array holding every bar.
    #[default]
    Array,
    /// Newline-delimited JSON (NDJSON/JSONL), one bar per line.
    Ndjson,
}

/// JSON formatter.
///
/// A one-shot [`write_bars`](Formatter::write_bars) call produces a complete
/// document. Streaming writers that emit the array in several batches use
/// [`write_array_items`](Self::write_array_items) and
/// [`close_array`](Self::close_array) instead.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    style: JsonStyle,
    /// Pretty-print one-shot arrays.
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a JSON array formatter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            style: JsonStyle::Array,
            pretty: false,
        }
    }

    /// Creates an NDJSON formatter.
    #[must_use]
    pub const fn ndjson() -> Self {
        Self {
            style: JsonStyle::Ndjson,
            pretty: false,
        }
    }

    /// Sets whether one-shot arrays are pretty-printed.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Sets the output style.
    #[must_use]
    pub const fn with_style(mut self, style: JsonStyle) -> Self {
        self.style = style;
        self
    }

    /// Returns the output style.
    #[must_use]
    pub const fn style(&self) -> JsonStyle {
        self.style
    }

    /// Writes bars as elements of a JSON array that spans several calls.
    ///
    /// `opened` tells whether an earlier call already wrote the opening
    /// bracket. Each element goes on its own line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_array_items<W: Write>(
        &self,
        bars: &[Bar],
        mut writer: W,
        opened: bool,
    ) -> Result<(), FormatError> {
        let mut opened = opened;
        for bar in bars {
            writer.write_all(if opened { b",\n" } else { b"[\n" })?;
            serde_json::to_writer(&mut writer, bar)?;
            opened = true;
        }
        writer.flush()?;
        Ok(())
    }

    /// Terminates an array started by [`write_array_items`](Self::write_array_items).
    ///
    /// Writes `[]` if no element was ever written.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn close_array<W: Write>(&self, mut writer: W, opened: bool) -> Result<(), FormatError> {
        writer.write_all(if opened { b"\n]\n" } else { b"[]\n" })?;
        writer.flush()?;
        Ok(())
    }
}

impl Formatter for JsonFormatter {
    fn write_bars<W: Write + Send>(&self, bars: &[Bar], mut writer: W) -> Result<(), FormatError> {
        match self.style {
            JsonStyle::Array if self.pretty => {
                serde_json::to_writer_pretty(&mut writer, bars)?;
                writeln!(writer)?;
            }
            JsonStyle::Array => {
                serde_json::to_writer(&mut writer, bars)?;
                writeln!(writer)?;
            }
            JsonStyle::Ndjson => {
                for bar in bars {
                    serde_json::to_writer(&mut writer, bar)?;
                    writeln!(writer)?;
                }
            }
        }
        writer.flush()?;
        Ok(())
    }

    fn extension(&self) -> &str {
        match self.style {
            JsonStyle::Array => "json",
            JsonStyle::Ndjson => "ndjson",
        }
    }
}
