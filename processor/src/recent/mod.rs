//! Recent files - remember which inputs were processed
//!
//! The list lives in a small JSON sidecar:
//!
//! ```json
//! { "recent_files": ["/data/run1.xlsx", "/data/run0.csv"] }
//! ```
//!
//! Newest first, capped at `max_entries`, paths that no longer exist are
//! dropped when the store is loaded.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{RecentFilesError, RecentResult};

/// Default sidecar location (relative to current dir)
pub const DEFAULT_RECENT_FILE: &str = ".sampleproc/recent_files.json";

/// Default number of entries kept
pub const DEFAULT_MAX_RECENT: usize = 10;

/// On-disk shape of the sidecar
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RecentFilesDocument {
    #[serde(default)]
    recent_files: Vec<PathBuf>,
}

/// Store of recently processed input files
#[derive(Debug, Clone)]
pub struct RecentFiles {
    /// Sidecar path
    path: PathBuf,
    /// Maximum number of entries
    max_entries: usize,
    /// Entries, newest first
    entries: Vec<PathBuf>,
}

impl RecentFiles {
    /// Load the store from the default location
    pub fn new() -> Self {
        Self::load(DEFAULT_RECENT_FILE, DEFAULT_MAX_RECENT)
    }

    /// Load the store from `path`.
    ///
    /// A missing or unreadable sidecar yields an empty list; entries whose
    /// files no longer exist are dropped.
    pub fn load(path: impl AsRef<Path>, max_entries: usize) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut entries = read_document(&path)
            .map(|doc| doc.recent_files)
            .unwrap_or_default();

        entries.retain(|p| p.exists());
        entries.truncate(max_entries);

        Self {
            path,
            max_entries,
            entries,
        }
    }

    /// Sidecar path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries, newest first
    pub fn list(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move `file` to the front, trim to capacity and persist.
    pub fn add(&mut self, file: impl AsRef<Path>) -> RecentResult<()> {
        let file = absolute(file.as_ref());
        self.entries.retain(|p| p != &file);
        self.entries.insert(0, file);
        self.entries.truncate(self.max_entries);
        self.save()
    }

    /// Resolve the entry at `index`.
    ///
    /// If the file has disappeared the entry is removed, the store persisted,
    /// and [`RecentFilesError::FileMissing`] returned.
    pub fn get(&mut self, index: usize) -> RecentResult<PathBuf> {
        let path = self
            .entries
            .get(index)
            .cloned()
            .ok_or(RecentFilesError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })?;

        if !path.exists() {
            self.entries.remove(index);
            self.save()?;
            return Err(RecentFilesError::FileMissing(path));
        }
        Ok(path)
    }

    /// Remove the entry at `index` and persist.
    pub fn remove(&mut self, index: usize) -> RecentResult<PathBuf> {
        if index >= self.entries.len() {
            return Err(RecentFilesError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(index);
        self.save()?;
        Ok(removed)
    }

    /// Forget every entry and persist.
    pub fn clear(&mut self) -> RecentResult<()> {
        self.entries.clear();
        self.save()
    }

    /// Write the sidecar.
    pub fn save(&self) -> RecentResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let doc = RecentFilesDocument {
            recent_files: self.entries.clone(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&doc)?)?;
        debug!(path = %self.path.display(), entries = self.entries.len(), "saved recent files");
        Ok(())
    }
}

impl Default for RecentFiles {
    fn default() -> Self {
        Self::new()
    }
}

fn read_document(path: &Path) -> Option<RecentFilesDocument> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!(path = %path.display(), "ignoring unreadable recent files: {}", e);
            None
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
