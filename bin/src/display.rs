//! Input/output plumbing and output formatting for the candela CLI.

use anyhow::{Context, Result};
use candela_daemon::StateManager;
use candela_lib::OutputFormat;
use clap::ValueEnum;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, BufReader};

/// Output format for finished candles.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
    Ndjson,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
            Format::Ndjson => Self::Ndjson,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", OutputFormat::from(*self))
    }
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Opens the trade feed; `-` reads stdin.
pub(crate) async fn open_input(path: &Path) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if is_stdio(path) {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }

    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open input: {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Opens the candle output; `-` writes stdout.
pub(crate) fn open_output(path: &Path) -> Result<Box<dyn Write + Send>> {
    if is_stdio(path) {
        return Ok(Box::new(std::io::stdout()));
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create output: {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Opens the checkpoint store, at `state_dir` or the default location.
pub(crate) fn state_manager(state_dir: Option<PathBuf>) -> Result<StateManager> {
    let path = state_dir.unwrap_or_else(StateManager::default_path);
    StateManager::new(path).context("Failed to initialize state manager")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncBufReadExt;

    #[test]
    fn test_format_conversion() {
        assert_eq!(OutputFormat::from(Format::Csv), OutputFormat::Csv);
        assert_eq!(Format::Ndjson.to_string(), "ndjson");
    }

    #[tokio::test]
    async fn test_open_input_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("trades.ndjson");
        std::fs::write(&path, "first\nsecond\n").unwrap();

        let mut lines = open_input(&path).await.unwrap().lines();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_open_input_missing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(open_input(&temp_dir.path().join("missing")).await.is_err());
    }

    #[test]
    fn test_open_output_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bars.csv");

        let mut writer = open_output(&path).unwrap();
        writer.write_all(b"ok").unwrap();
        writer.flush().unwrap();
        drop(writer);

        assert_eq!(std::fs::read_to_string(path).unwrap(), "ok");
    }
}
