//! Incremental output of bars that arrive in batches.

use candela_aggregate::Bar;
use std::io::Write;

use crate::{CsvFormatter, FormatError, Formatter, JsonFormatter, OutputFormat};

/// Writes successive batches of bars as one well-formed output stream.
///
/// CSV gets a single header before the first row. A JSON array is opened by
/// the first bar and closed by [`finish`](Self::finish); NDJSON needs no
/// framing.
#[derive(Debug)]
pub struct BarWriter<W> {
    writer: W,
    format: OutputFormat,
    written: usize,
    finished: bool,
}

impl<W: Write + Send> BarWriter<W> {
    /// Creates a writer emitting `format` into `writer`.
    #[must_use]
    pub const fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            written: 0,
            finished: false,
        }
    }

    /// Returns the output format.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Returns the number of bars written so far.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Appends a batch and flushes the underlying writer.
    ///
    /// Empty batches write nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or the stream was already finished.
    pub fn write_batch(&mut self, bars: &[Bar]) -> Result<(), FormatError> {
        if bars.is_empty() {
            return Ok(());
        }
        if self.finished {
            return Err(FormatError::Finished);
        }

        let first = self.written == 0;
        match self.format {
            OutputFormat::Csv => CsvFormatter::new()
                .with_header(first)
                .write_bars(bars, &mut self.writer)?,
            OutputFormat::Json => {
                JsonFormatter::new().write_array_items(bars, &mut self.writer, !first)?;
            }
            OutputFormat::Ndjson => JsonFormatter::ndjson().write_bars(bars, &mut self.writer)?,
        }

        self.written += bars.len();
        Ok(())
    }

    /// Completes the stream. Idempotent.
    ///
    /// Closes the JSON array (writing `[]` when no bar was written) and
    /// flushes the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn finish(&mut self) -> Result<(), FormatError> {
        if !self.finished && self.format == OutputFormat::Json {
            JsonFormatter::new().close_array(&mut self.writer, self.written > 0)?;
        }
        self.finished = true;
        self.writer.flush()?;
        Ok(())
    }

    /// Consumes the writer, returning the underlying output.
    ///
    /// Call [`finish`](Self::finish) first for a complete JSON document.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candela_types::Trade;
    use chrono::{TimeZone, Utc};

    fn create_test_bars(symbols: &[&str]) -> Vec<Bar> {
        let bucket = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        symbols
            .iter()
            .map(|symbol| Bar::from_trade(&Trade::new(*symbol, 100.0, 5.0, bucket), bucket))
            .collect()
    }

    fn written(format: OutputFormat, batches: &[&[&str]]) -> String {
        let mut writer = BarWriter::new(Vec::new(), format);
        for batch in batches {
            writer.write_batch(&create_test_bars(batch)).unwrap();
        }
        writer.finish().unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_json_batches_form_one_document() {
        let output = written(OutputFormat::Json, &[&["AAPL"], &[], &["MSFT", "SPY"]]);

        let parsed: Vec<Bar> = serde_json::from_str(&output).unwrap();
        let symbols: Vec<&str> = parsed.iter().map(|bar| bar.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAPL", "MSFT", "SPY"]);
    }

    #[test]
    fn test_json_without_bars() {
        assert_eq!(written(OutputFormat::Json, &[&[]]), "[]\n");
    }

    #[test]
    fn test_csv_single_header() {
        let output = written(OutputFormat::Csv, &[&["AAPL"], &["MSFT"]]);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "symbol,datetime,open,high,low,close,volume");
        assert!(lines[2].starts_with("MSFT,"));
    }

    #[test]
    fn test_ndjson_batches() {
        let output = written(OutputFormat::Ndjson, &[&["AAPL"], &["MSFT"]]);
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_finish_is_idempotent_and_final() {
        let mut writer = BarWriter::new(Vec::new(), OutputFormat::Json);
        writer.write_batch(&create_test_bars(&["AAPL"])).unwrap();
        writer.finish().unwrap();
        writer.finish().unwrap();

        assert!(matches!(
            writer.write_batch(&create_test_bars(&["MSFT"])),
            Err(FormatError::Finished)
        ));
        assert_eq!(writer.written(), 1);
        let output = writer.into_inner();
        assert!(serde_json::from_slice::<Vec<Bar>>(&output).is_ok());
    }
}
