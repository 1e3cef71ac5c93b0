//! Storage collaborator interface and two local implementations
//!
//! The provider asks for one [`ChainSnapshot`] per query, so the height and
//! the outputs it evaluates always come from the same read.

use std::fs;
use std::path::{Path, PathBuf};

use bitcoin::OutPoint;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::output::UnspentOutput;

/// Best chain height and tracked outputs from one consistent read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub current_height: u32,
    pub outputs: Vec<UnspentOutput>,
}

/// Read-only access to the wallet's local chain view
///
/// Implementations must not block on network I/O.
pub trait UtxoStorage {
    /// One consistent read; `None` if the wallet has never synced
    fn snapshot(&self) -> Result<Option<ChainSnapshot>, StorageError>;

    fn current_height(&self) -> Result<Option<u32>, StorageError> {
        Ok(self.snapshot()?.map(|s| s.current_height))
    }

    fn tracked_outputs(&self) -> Result<Vec<UnspentOutput>, StorageError> {
        Ok(self.snapshot()?.map(|s| s.outputs).unwrap_or_default())
    }
}

impl<S: UtxoStorage + ?Sized> UtxoStorage for &S {
    fn snapshot(&self) -> Result<Option<ChainSnapshot>, StorageError> {
        (**self).snapshot()
    }
}

impl<S: UtxoStorage + ?Sized> UtxoStorage for std::sync::Arc<S> {
    fn snapshot(&self) -> Result<Option<ChainSnapshot>, StorageError> {
        (**self).snapshot()
    }
}

/// In-memory chain view updated by a block processor
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: RwLock<Option<ChainSnapshot>>,
}

impl MemoryStorage {
    /// Storage for a wallet that has not synced yet
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: ChainSnapshot) -> Self {
        Self {
            state: RwLock::new(Some(snapshot)),
        }
    }

    /// Advance to `height`, adding and removing outputs in the same write
    pub fn apply_block(&self, height: u32, added: Vec<UnspentOutput>, spent: &[OutPoint]) {
        let mut state = self.state.write();
        let snapshot = state.get_or_insert_with(ChainSnapshot::default);

        snapshot
            .outputs
            .retain(|output| !spent.contains(&output.outpoint));
        snapshot.outputs.extend(added);
        snapshot.current_height = height;

        log::debug!(
            "Applied block {}: {} outputs tracked",
            height,
            snapshot.outputs.len()
        );
    }
}

impl UtxoStorage for MemoryStorage {
    fn snapshot(&self) -> Result<Option<ChainSnapshot>, StorageError> {
        Ok(self.state.read().clone())
    }
}

/// JSON snapshot file on local disk
///
/// The file is written whole by the sync process and read whole per query.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a snapshot via a temporary file and rename
    pub fn save(&self, snapshot: &ChainSnapshot) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl UtxoStorage for FileStorage {
    fn snapshot(&self) -> Result<Option<ChainSnapshot>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&contents)?;
        Ok(Some(snapshot))
    }
}
