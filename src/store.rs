//! The data store for the persisted [BranchTree].

use crate::{
    errors::{RestackError, RestackResult},
    tree::BranchTree,
};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Loads and persists the [BranchTree] as a flat JSON object at a fixed path.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BranchTreeStore {
    /// The path of the JSON document.
    path: PathBuf,
}

impl BranchTreeStore {
    /// Creates a new [BranchTreeStore] backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the [BranchTree] from disk.
    ///
    /// ## Returns
    /// - `Ok(BranchTree)` - The persisted tree, or an empty tree if the file does not exist.
    /// - `Err(_)` - If the file cannot be read or is not a JSON object of strings.
    pub fn load(&self) -> RestackResult<BranchTree> {
        // A missing store is an empty forest.
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No branch tree store found, starting empty");
            return Ok(BranchTree::default());
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| self.storage_error(e))?;
        let tree: BranchTree = serde_json::from_str(&raw).map_err(|e| self.storage_error(e))?;
        debug!(path = %self.path.display(), branches = tree.len(), "Loaded branch tree");

        Ok(tree)
    }

    /// Persists the [BranchTree] to disk, overwriting any previous contents.
    ///
    /// The tree is written to a sibling temporary file and renamed into place, so a concurrent
    /// [BranchTreeStore::load] never observes a partial write.
    pub fn save(&self, tree: &BranchTree) -> RestackResult<()> {
        let serialized = serde_json::to_string_pretty(tree).map_err(|e| self.storage_error(e))?;

        let temp_path = self.temp_path();
        let written = Self::write_synced(&temp_path, serialized.as_bytes())
            .and_then(|_| fs::rename(&temp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(self.storage_error(e));
        }

        debug!(path = %self.path.display(), branches = tree.len(), "Persisted branch tree");
        Ok(())
    }

    /// Writes `contents` to `path` and flushes it to the device, so the rename that follows can never
    /// expose an empty or truncated file after a crash.
    fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    /// The temporary file that [BranchTreeStore::save] writes before renaming.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn storage_error(&self, e: impl ToString) -> RestackError {
        RestackError::Storage {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}
