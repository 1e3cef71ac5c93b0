//! UTXO spendability and checkpoint bootstrap policy
//!
//! Decides, for a wallet's local chain view, which unspent outputs can be
//! spent now, which are still time-locked, and which trusted checkpoint
//! chain validation starts from.
//!
//! # Architecture
//!
//! - **Header codec** (`header`): fixed-layout checkpoint records
//! - **Checkpoints** (`checkpoint`): blob parsing and a per-network registry
//! - **Classifier** (`classifier`): reserve tag markers from config
//! - **Policy** (`policy`): confirmation depth and time-lock rules
//! - **Provider** (`provider`): composes the above over one storage snapshot
//!
//! Everything on the query path is synchronous and total. Only loading
//! (checkpoints, config, storage files) can fail.
//!
//! # Example
//!
//! ```ignore
//! use utxo_policy::{CoreConfig, MemoryStorage, ReserveMarkers, UnspentOutputProvider};
//!
//! let config = CoreConfig::from_env();
//! let provider = UnspentOutputProvider::new(
//!     MemoryStorage::new(),
//!     ReserveMarkers::embedded()?,
//!     config.confirmation_policy(),
//! );
//!
//! let spendable = provider.spendable_outputs();
//! let locked = provider.locked_outputs();
//! ```

pub mod checkpoint;
pub mod classifier;
pub mod config;
pub mod error;
pub mod header;
pub mod network;
pub mod output;
pub mod policy;
pub mod provider;
pub mod storage;

pub use checkpoint::{Checkpoint, CheckpointProfile, CheckpointRegistry};
pub use classifier::{OutputClass, ReserveMarkers};
pub use config::CoreConfig;
pub use error::{CheckpointError, ConfigError, HeaderError, PowError, StorageError};
pub use header::{Block, BlockHeader, CHECKPOINT_RECORD_LEN, HEADER_LEN};
pub use network::{Network, NetworkParams, ProofOfWorkPolicy};
pub use output::UnspentOutput;
pub use policy::{sort_locked, ConfirmationPolicy, ConfirmationView, LockedOutput};
pub use provider::{Balance, UnspentOutputProvider};
pub use storage::{ChainSnapshot, FileStorage, MemoryStorage, UtxoStorage};
