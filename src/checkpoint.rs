//! Trusted checkpoints for bootstrapping chain validation
//!
//! A checkpoint blob is a newline-separated list of hex records (see
//! [`crate::header`]). The first record is the anchor block; everything
//! below the anchor's height is never downloaded or validated. Any further
//! records are additional blocks handed to chain validation as-is.
//!
//! Loading is all-or-nothing: one bad line fails the whole blob.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};

use crate::error::CheckpointError;
use crate::header::Block;
use crate::network::Network;

/// Named checkpoint variants available on every network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckpointProfile {
    /// Early anchor, from when BIP44 wallets were introduced
    Bip44,
    /// Most recent anchor shipped with this build
    Last,
}

impl CheckpointProfile {
    pub const ALL: [CheckpointProfile; 2] = [CheckpointProfile::Bip44, CheckpointProfile::Last];

    pub fn name(self) -> &'static str {
        match self {
            CheckpointProfile::Bip44 => "bip44",
            CheckpointProfile::Last => "last",
        }
    }
}

impl fmt::Display for CheckpointProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CheckpointProfile {
    type Err = CheckpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bip44" => Ok(CheckpointProfile::Bip44),
            "last" => Ok(CheckpointProfile::Last),
            other => Err(CheckpointError::InvalidProfile(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub anchor_block: Block,
    pub additional_blocks: Vec<Block>,
}

impl Checkpoint {
    /// Parse a checkpoint blob
    pub fn load(raw_hex: &str) -> Result<Self, CheckpointError> {
        let mut blocks = Vec::new();

        for (index, line) in raw_hex.split('\n').enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            blocks.push(decode_line(index + 1, line)?);
        }

        let mut blocks = blocks.into_iter();
        let anchor_block = blocks.next().ok_or(CheckpointError::EmptyCheckpointData)?;
        let checkpoint = Checkpoint {
            anchor_block,
            additional_blocks: blocks.collect(),
        };

        log::info!(
            "✅ Loaded checkpoint anchor at height {} ({})",
            checkpoint.anchor_block.height,
            checkpoint.anchor_block.hash()
        );
        log::debug!("   Additional blocks: {}", checkpoint.additional_blocks.len());

        Ok(checkpoint)
    }

    /// Anchor first, then additional blocks in blob order
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        std::iter::once(&self.anchor_block).chain(self.additional_blocks.iter())
    }

    pub fn tip(&self) -> &Block {
        self.additional_blocks.last().unwrap_or(&self.anchor_block)
    }

    pub fn contains_height(&self, height: u32) -> bool {
        self.blocks().any(|block| block.height == height)
    }

    pub fn block_count(&self) -> usize {
        1 + self.additional_blocks.len()
    }
}

fn decode_line(line_no: usize, line: &str) -> Result<Block, CheckpointError> {
    let bytes = hex::decode(line)
        .map_err(|e| CheckpointError::malformed_line(line_no, format!("invalid hex: {}", e)))?;

    let (block, consumed) =
        Block::decode(&bytes).map_err(|e| CheckpointError::malformed_line(line_no, e.to_string()))?;

    if consumed != bytes.len() {
        return Err(CheckpointError::malformed_line(
            line_no,
            format!("{} trailing bytes after record", bytes.len() - consumed),
        ));
    }

    Ok(block)
}

type ProfileKey = (Network, CheckpointProfile);

/// Checkpoints keyed by network and profile, each parsed on first access
///
/// A successful parse is kept for the life of the registry. A failed parse
/// is reported to every caller and only affects its own key.
pub struct CheckpointRegistry {
    blobs: HashMap<ProfileKey, Cow<'static, str>>,
    loaded: HashMap<ProfileKey, OnceCell<Arc<Checkpoint>>>,
}

static GLOBAL: Lazy<CheckpointRegistry> = Lazy::new(CheckpointRegistry::embedded);

impl CheckpointRegistry {
    /// Process-wide registry over the blobs shipped with the crate
    pub fn global() -> &'static CheckpointRegistry {
        &GLOBAL
    }

    /// Registry over the blobs shipped with the crate
    pub fn embedded() -> Self {
        let mut blobs = HashMap::new();
        for network in Network::ALL {
            for profile in CheckpointProfile::ALL {
                blobs.insert(
                    (network, profile),
                    Cow::Borrowed(network.checkpoint_blob(profile)),
                );
            }
        }
        Self::from_blobs(blobs)
    }

    /// Replace the blob for one profile, e.g. with data read from disk
    pub fn with_blob(
        mut self,
        network: Network,
        profile: CheckpointProfile,
        raw_hex: impl Into<String>,
    ) -> Self {
        self.blobs
            .insert((network, profile), Cow::Owned(raw_hex.into()));
        self.loaded.insert((network, profile), OnceCell::new());
        self
    }

    fn from_blobs(blobs: HashMap<ProfileKey, Cow<'static, str>>) -> Self {
        let loaded = blobs.keys().map(|key| (*key, OnceCell::new())).collect();
        Self { blobs, loaded }
    }

    /// Checkpoint for a profile given by name (`"bip44"` or `"last"`)
    pub fn load(
        &self,
        network: Network,
        profile_name: &str,
    ) -> Result<Arc<Checkpoint>, CheckpointError> {
        let profile = profile_name.parse::<CheckpointProfile>()?;
        self.get(network, profile)
    }

    pub fn get(
        &self,
        network: Network,
        profile: CheckpointProfile,
    ) -> Result<Arc<Checkpoint>, CheckpointError> {
        let key = (network, profile);
        let (blob, cell) = match (self.blobs.get(&key), self.loaded.get(&key)) {
            (Some(blob), Some(cell)) => (blob, cell),
            _ => return Err(CheckpointError::InvalidProfile(profile.to_string())),
        };

        cell.get_or_try_init(|| {
            log::debug!("Parsing {} checkpoint for {}", profile, network);
            Checkpoint::load(blob).map(Arc::new)
        })
        .map(Arc::clone)
        .map_err(|e| {
            log::warn!("⚠️  Checkpoint {}/{} unusable: {}", network, profile, e);
            e
        })
    }
}
