//! Error types for checkpoint loading, configuration and storage
//!
//! Only the loading boundary can fail. Classification, confirmation policy
//! and the unspent output provider are total and never return these.

use thiserror::Error;

/// A fixed-layout block header could not be read from the byte stream
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("Malformed header: field `{field}` needs {needed} bytes, {remaining} remaining")]
    MalformedHeader {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },
}

/// Checkpoint data for a network profile is unusable
///
/// Fatal for that profile only. Callers fall back to a full sync from
/// genesis rather than trusting a partial checkpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("Checkpoint data contains no block lines")]
    EmptyCheckpointData,

    #[error("Malformed checkpoint line {line}: {reason}")]
    MalformedCheckpointLine { line: usize, reason: String },

    #[error("Invalid checkpoint profile: {0}")]
    InvalidProfile(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid reserve marker `{marker}`: {reason}")]
    InvalidMarker { marker: String, reason: String },

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Invalid confirmation threshold: {0}")]
    InvalidThreshold(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Proof-of-work check failure, only produced under an enforced policy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PowError {
    #[error("Block {hash} does not meet its target (bits {bits:#010x})")]
    TargetNotMet { hash: String, bits: u32 },
}

impl CheckpointError {
    pub(crate) fn malformed_line(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedCheckpointLine {
            line,
            reason: reason.into(),
        }
    }
}
