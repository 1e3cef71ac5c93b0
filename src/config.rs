//! Runtime configuration from environment variables
//!
//! Selects the network, which checkpoint profile bootstraps validation, and
//! how deep an output must be before it is spendable.

use std::env;

use crate::checkpoint::CheckpointProfile;
use crate::error::ConfigError;
use crate::network::{Network, NetworkParams};
use crate::policy::ConfirmationPolicy;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    pub network: Network,
    /// Chosen by configuration; never upgraded automatically
    pub checkpoint_profile: CheckpointProfile,
    pub confirmation_threshold: u32,
}

impl CoreConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `UTXO_NETWORK`: "mainnet" (default) or "testnet"
    /// - `CHECKPOINT_PROFILE`: "last" (default) or "bip44"
    /// - `CONFIRMATION_THRESHOLD`: blocks required on top of an output (network default)
    ///
    /// Unknown values are logged and replaced by the default.
    pub fn from_env() -> Self {
        let network = match env::var("UTXO_NETWORK") {
            Ok(value) => value.parse::<Network>().unwrap_or_else(|e| {
                log::warn!("⚠️  {}, defaulting to mainnet", e);
                Network::Mainnet
            }),
            Err(_) => Network::Mainnet,
        };
        log::info!("🌐 Using {} network", network);

        let checkpoint_profile = match env::var("CHECKPOINT_PROFILE") {
            Ok(value) => value
                .trim()
                .to_lowercase()
                .parse::<CheckpointProfile>()
                .unwrap_or_else(|e| {
                    log::warn!("⚠️  {}, defaulting to last", e);
                    CheckpointProfile::Last
                }),
            Err(_) => CheckpointProfile::Last,
        };

        let default_threshold = network.params().default_confirmation_threshold;
        let confirmation_threshold = match env::var("CONFIRMATION_THRESHOLD") {
            Ok(value) => parse_threshold(&value).unwrap_or_else(|e| {
                log::warn!("⚠️  {}, defaulting to {}", e, default_threshold);
                default_threshold
            }),
            Err(_) => default_threshold,
        };
        log::info!(
            "📌 Checkpoint profile: {}, confirmation threshold: {}",
            checkpoint_profile,
            confirmation_threshold
        );

        Self {
            network,
            checkpoint_profile,
            confirmation_threshold,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmation_threshold == 0 {
            return Err(ConfigError::InvalidThreshold(
                "threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn network_params(&self) -> NetworkParams {
        self.network.params()
    }

    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy::for_network(&self.network_params(), self.confirmation_threshold)
    }
}

fn parse_threshold(value: &str) -> Result<u32, ConfigError> {
    let threshold = value
        .trim()
        .parse::<u32>()
        .map_err(|e| ConfigError::InvalidThreshold(format!("{}: {}", value, e)))?;
    if threshold == 0 {
        return Err(ConfigError::InvalidThreshold(
            "threshold must be at least 1".to_string(),
        ));
    }
    Ok(threshold)
}

impl Default for CoreConfig {
    /// Mainnet, latest checkpoint, network default threshold
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            checkpoint_profile: CheckpointProfile::Last,
            confirmation_threshold: Network::Mainnet.params().default_confirmation_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_mainnet_last() {
        let config = CoreConfig::default();
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.checkpoint_profile, CheckpointProfile::Last);
        assert_eq!(config.confirmation_threshold, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_uses_network_month() {
        let config = CoreConfig {
            network: Network::Testnet,
            confirmation_threshold: 2,
            ..Default::default()
        };
        let policy = config.confirmation_policy();
        assert_eq!(policy.confirmation_threshold, 2);
        assert_eq!(policy.blocks_per_month, 86_400);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = CoreConfig {
            confirmation_threshold: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold(_))
        ));
        assert!(parse_threshold("0").is_err());
        assert!(parse_threshold("six").is_err());
        assert_eq!(parse_threshold(" 12 ").unwrap(), 12);
    }

    // Only test in the crate that touches these variables
    #[test]
    fn test_from_env_falls_back_on_bad_values() {
        env::set_var("UTXO_NETWORK", "TESTNET");
        env::set_var("CHECKPOINT_PROFILE", "genesis");
        env::set_var("CONFIRMATION_THRESHOLD", "zero");

        let config = CoreConfig::from_env();

        env::remove_var("UTXO_NETWORK");
        env::remove_var("CHECKPOINT_PROFILE");
        env::remove_var("CONFIRMATION_THRESHOLD");

        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.checkpoint_profile, CheckpointProfile::Last);
        assert_eq!(
            config.confirmation_threshold,
            Network::Testnet.params().default_confirmation_threshold
        );
    }
}
