//! Per-network constants and embedded checkpoint data
//!
//! The blobs under `checkpoints/` are placeholder records in the exact
//! checkpoint layout, not real network anchors. Replace them with blocks
//! taken from each network before release; no code change is needed.

use std::fmt;
use std::str::FromStr;

use bitcoin::Target;

use crate::checkpoint::CheckpointProfile;
use crate::error::{ConfigError, PowError};
use crate::header::BlockHeader;

const SECONDS_PER_MONTH: u32 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    pub fn params(self) -> NetworkParams {
        match self {
            Network::Mainnet => NetworkParams::new(30, 6, ProofOfWorkPolicy::Disabled),
            Network::Testnet => NetworkParams::new(30, 1, ProofOfWorkPolicy::Disabled),
        }
    }

    /// Raw hex blob for a checkpoint profile on this network
    ///
    /// Placeholder data until real anchors are dropped into `checkpoints/`.
    pub fn checkpoint_blob(self, profile: CheckpointProfile) -> &'static str {
        match (self, profile) {
            (Network::Mainnet, CheckpointProfile::Bip44) => {
                include_str!("../checkpoints/mainnet-bip44.hex")
            }
            (Network::Mainnet, CheckpointProfile::Last) => {
                include_str!("../checkpoints/mainnet-last.hex")
            }
            (Network::Testnet, CheckpointProfile::Bip44) => {
                include_str!("../checkpoints/testnet-bip44.hex")
            }
            (Network::Testnet, CheckpointProfile::Last) => {
                include_str!("../checkpoints/testnet-last.hex")
            }
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Whether headers are checked against their compact target
///
/// The production networks ship with `Disabled`: block acceptance is decided
/// by an external consensus mechanism and the client does not re-check work.
/// Confirm against current network rules before switching a network to
/// `Enforced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofOfWorkPolicy {
    Disabled,
    Enforced,
}

impl ProofOfWorkPolicy {
    pub fn check(self, header: &BlockHeader) -> Result<(), PowError> {
        match self {
            ProofOfWorkPolicy::Disabled => Ok(()),
            ProofOfWorkPolicy::Enforced => {
                let target = Target::from_compact(header.bits);
                if target.is_met_by(header.header_hash) {
                    Ok(())
                } else {
                    Err(PowError::TargetNotMet {
                        hash: header.header_hash.to_string(),
                        bits: header.bits.to_consensus(),
                    })
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkParams {
    pub target_spacing_secs: u32,
    /// Blocks mined in ~30 days at the target spacing
    pub blocks_per_month: u32,
    pub default_confirmation_threshold: u32,
    pub pow_policy: ProofOfWorkPolicy,
}

impl NetworkParams {
    const fn new(
        target_spacing_secs: u32,
        default_confirmation_threshold: u32,
        pow_policy: ProofOfWorkPolicy,
    ) -> Self {
        Self {
            target_spacing_secs,
            blocks_per_month: SECONDS_PER_MONTH / target_spacing_secs,
            default_confirmation_threshold,
            pow_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::block::Version;
    use bitcoin::hashes::Hash;
    use bitcoin::{BlockHash, CompactTarget, TxMerkleNode};

    fn header_with(hash: [u8; 32], bits: u32) -> BlockHeader {
        BlockHeader {
            version: Version::from_consensus(1),
            previous_hash: BlockHash::all_zeros(),
            merkle_root: TxMerkleNode::all_zeros(),
            timestamp: 0,
            bits: CompactTarget::from_consensus(bits),
            nonce: 0,
            header_hash: BlockHash::from_byte_array(hash),
        }
    }

    #[test]
    fn test_blocks_per_month() {
        assert_eq!(Network::Mainnet.params().blocks_per_month, 86_400);
        assert_eq!(Network::Testnet.params().blocks_per_month, 86_400);
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("MAINNET".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!(" testnet ".parse::<Network>().unwrap(), Network::Testnet);
        assert!(matches!(
            "regtest".parse::<Network>(),
            Err(ConfigError::UnknownNetwork(n)) if n == "regtest"
        ));
    }

    #[test]
    fn test_shipped_networks_do_not_check_work() {
        for network in Network::ALL {
            assert_eq!(network.params().pow_policy, ProofOfWorkPolicy::Disabled);
        }
        // A hash far above any target still passes when disabled
        let header = header_with([0xff; 32], 0x1d00_ffff);
        assert!(ProofOfWorkPolicy::Disabled.check(&header).is_ok());
    }

    #[test]
    fn test_enforced_policy_compares_hash_to_target() {
        let easy = header_with([0x00; 32], 0x207f_ffff);
        assert!(ProofOfWorkPolicy::Enforced.check(&easy).is_ok());

        let hard = header_with([0xff; 32], 0x1d00_ffff);
        assert!(matches!(
            ProofOfWorkPolicy::Enforced.check(&hard),
            Err(PowError::TargetNotMet { bits: 0x1d00_ffff, .. })
        ));
    }
}
