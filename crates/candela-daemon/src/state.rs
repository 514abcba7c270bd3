//! Checkpoint storage for aggregator state.

use candela_aggregate::AggregatorSnapshot;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CHECKPOINT_FILE: &str = "checkpoint.json";

/// Errors that can occur during state management operations.
#[derive(Error, Debug)]
pub enum StateError {
    /// Failed to create a directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to delete a file.
    #[error("Failed to delete file '{path}': {source}")]
    DeleteFile {
        /// The path that could not be deleted.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse JSON.
    #[error("Failed to parse checkpoint '{path}': {source}")]
    ParseJson {
        /// The path that could not be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Failed to serialize JSON.
    #[error("Failed to serialize checkpoint: {0}")]
    SerializeJson(#[from] serde_json::Error),
}

/// Result type for state operations.
pub type Result<T> = std::result::Result<T, StateError>;

/// Manages the on-disk checkpoint of in-progress candles.
///
/// The checkpoint is a single JSON file, `checkpoint.json`, in the base
/// directory. It is replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct StateManager {
    /// Base directory for state storage.
    base_path: PathBuf,
}

impl StateManager {
    /// Creates a new state manager with the given base path.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(base_path: PathBuf) -> Result<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| StateError::CreateDir {
                path: base_path.clone(),
                source: e,
            })?;
        }

        Ok(Self { base_path })
    }

    /// Returns the default path for candela state storage.
    ///
    /// Uses the `directories` crate to find the appropriate location:
    /// - Linux: `~/.local/share/candela/`
    /// - macOS: `~/Library/Application Support/candela/`
    /// - Windows: `C:\Users\<User>\AppData\Roaming\candela\`
    ///
    /// Falls back to `~/.candela/` if the platform-specific location
    /// cannot be determined.
    #[must_use]
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "candela").map_or_else(dirs_fallback, |proj_dirs| {
            proj_dirs.data_dir().to_path_buf()
        })
    }

    /// Creates a state manager at the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn with_default_path() -> Result<Self> {
        Self::new(Self::default_path())
    }

    /// Returns the base path for state storage.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the path of the checkpoint file.
    #[must_use]
    pub fn checkpoint_path(&self) -> PathBuf {
        self.base_path.join(CHECKPOINT_FILE)
    }

    /// Saves a snapshot, replacing any previous checkpoint.
    ///
    /// The snapshot is written to a temporary file first and renamed into
    /// place, so a crash mid-write leaves the previous checkpoint intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or written.
    pub fn save_checkpoint(&self, snapshot: &AggregatorSnapshot) -> Result<()> {
        let path = self.checkpoint_path();
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(snapshot)?;

        fs::write(&tmp_path, json).map_err(|e| StateError::WriteFile {
            path: tmp_path.clone(),
            source: e,
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| StateError::WriteFile { path, source: e })
    }

    /// Loads the saved snapshot, if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint exists but cannot be read or parsed.
    pub fn load_checkpoint(&self) -> Result<Option<AggregatorSnapshot>> {
        let path = self.checkpoint_path();

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| StateError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StateError::ParseJson { path, source: e })
    }

    /// Deletes the checkpoint.
    ///
    /// Returns `false` if there was nothing to delete.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint exists but cannot be deleted.
    pub fn clear_checkpoint(&self) -> Result<bool> {
        let path = self.checkpoint_path();

        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path).map_err(|e| StateError::DeleteFile { path, source: e })?;
        Ok(true)
    }
}

/// Fallback for determining home directory.
fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".candela")
}
