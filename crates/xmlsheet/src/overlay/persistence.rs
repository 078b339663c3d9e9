//! Storage backends for the overlay store.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{Result, XmlSheetError};

use super::store::OverlayState;

/// Default file name of the overlay store.
pub const DEFAULT_STORE_FILE: &str = "xmlsheet.overlay.json";

/// Durable home of the overlay state.
///
/// `save` must not return before the state is durable; a failed `save` must
/// leave the previously saved state readable.
pub trait StorageBackend: Send + Sync {
    /// Load the saved state, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<OverlayState>>;

    /// Replace the saved state.
    fn save(&self, state: &OverlayState) -> Result<()>;

    /// Keep a copy of a state that is about to be discarded.
    fn snapshot(&self, _state: &OverlayState) -> Result<()> {
        Ok(())
    }

    /// Human-readable location, for logs and status output.
    fn describe(&self) -> String;
}

/// Keeps the state in memory. Durable for the life of the process only.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    saved: Mutex<Option<OverlayState>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds a saved state.
    pub fn with_state(state: OverlayState) -> Self {
        Self {
            saved: Mutex::new(Some(state)),
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self) -> Result<Option<OverlayState>> {
        let saved = self
            .saved
            .lock()
            .map_err(|_| XmlSheetError::Persistence("memory store lock poisoned".to_string()))?;
        Ok(saved.clone())
    }

    fn save(&self, state: &OverlayState) -> Result<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| XmlSheetError::Persistence("memory store lock poisoned".to_string()))?;
        *saved = Some(state.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Stores the state as one pretty-printed JSON file.
///
/// Writes go to a sibling temp file which is then renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
    keep_history: bool,
}

impl JsonFileBackend {
    /// Store at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keep_history: false,
        }
    }

    /// Keep a timestamped copy of the state each time it is cleared.
    ///
    /// File structure:
    /// ```text
    /// data/
    /// ├── xmlsheet.overlay.json            # Current state
    /// └── xmlsheet.overlay.history/
    ///     └── 2024-12-30T10-00-00.json     # State before a restore
    /// ```
    pub fn with_history(mut self, keep_history: bool) -> Self {
        self.keep_history = keep_history;
        self
    }

    /// Path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List saved snapshots, newest first.
    pub fn list_history(&self) -> Result<Vec<PathBuf>> {
        let history_dir = history_directory(&self.path);

        if !history_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&history_dir)
            .map_err(|e| {
                XmlSheetError::Persistence(format!(
                    "Failed to read history directory '{}': {}",
                    history_dir.display(),
                    e
                ))
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();

        // File names are timestamps
        entries.sort_by(|a, b| b.cmp(a));

        Ok(entries)
    }

    fn write_atomically(&self, path: &Path, state: &OverlayState) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    XmlSheetError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let temp_path = temp_path_for(path);
        let file = File::create(&temp_path).map_err(|e| {
            XmlSheetError::Persistence(format!(
                "Failed to create file '{}': {}",
                temp_path.display(),
                e
            ))
        })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, state).map_err(|e| {
            XmlSheetError::Persistence(format!("Failed to serialize overlay store: {}", e))
        })?;
        writer
            .flush()
            .and_then(|_| writer.get_ref().sync_all())
            .map_err(|e| {
                XmlSheetError::Persistence(format!(
                    "Failed to write '{}': {}",
                    temp_path.display(),
                    e
                ))
            })?;

        fs::rename(&temp_path, path).map_err(|e| {
            XmlSheetError::Persistence(format!(
                "Failed to replace '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

impl StorageBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<OverlayState>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(XmlSheetError::Persistence(format!(
                    "Failed to open file '{}': {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let reader = BufReader::new(file);
        let state: OverlayState = serde_json::from_reader(reader).map_err(|e| {
            XmlSheetError::Persistence(format!(
                "Failed to parse overlay store '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(Some(state))
    }

    fn save(&self, state: &OverlayState) -> Result<()> {
        self.write_atomically(&self.path, state)?;
        debug!(path = %self.path.display(), records = state.custom_fields.len(), "saved overlay store");
        Ok(())
    }

    fn snapshot(&self, state: &OverlayState) -> Result<()> {
        if !self.keep_history {
            return Ok(());
        }

        let timestamp = state.last_sync.format("%Y-%m-%dT%H-%M-%S%.3f").to_string();
        let history_file = history_directory(&self.path).join(format!("{}.json", timestamp));
        self.write_atomically(&history_file, state)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Get the history directory for a store file.
fn history_directory(path: &Path) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let parent = path.parent().unwrap_or(Path::new("."));

    parent.join(format!("{}.history", stem))
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
