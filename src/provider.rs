//! Spendable and locked output queries
//!
//! Composes classification and confirmation policy over one storage
//! snapshot per call. Nothing is cached between calls; callers re-query
//! after new blocks arrive.

use crate::classifier::{OutputClass, ReserveMarkers};
use crate::policy::{sort_locked, ConfirmationPolicy, ConfirmationView, LockedOutput};
use crate::output::UnspentOutput;
use crate::storage::{ChainSnapshot, UtxoStorage};

/// Value totals derived from one snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Balance {
    /// Outputs returned by `spendable_outputs`
    pub spendable: u64,
    /// Recognized outputs still under a time-lock
    pub locked: u64,
    /// Recognized outputs waiting on confirmation depth
    pub immature: u64,
}

pub struct UnspentOutputProvider<S> {
    storage: S,
    markers: ReserveMarkers,
    policy: ConfirmationPolicy,
}

impl<S: UtxoStorage> UnspentOutputProvider<S> {
    pub fn new(storage: S, markers: ReserveMarkers, policy: ConfirmationPolicy) -> Self {
        Self {
            storage,
            markers,
            policy,
        }
    }

    /// Recognized outputs that are deep enough and past any lock
    ///
    /// Order follows the storage snapshot.
    pub fn spendable_outputs(&self) -> Vec<UnspentOutput> {
        let Some(snapshot) = self.read_snapshot() else {
            return Vec::new();
        };

        let spendable: Vec<UnspentOutput> = snapshot
            .outputs
            .into_iter()
            .filter(|output| {
                let (class, view) = self.inspect(output, snapshot.current_height);
                class.is_recognized() && view.is_confirmed
            })
            .collect();

        log::debug!(
            "{} spendable outputs at height {}",
            spendable.len(),
            snapshot.current_height
        );
        spendable
    }

    /// Every time-locked output, whatever its class, in display order
    pub fn locked_outputs(&self) -> Vec<LockedOutput> {
        let Some(snapshot) = self.read_snapshot() else {
            return Vec::new();
        };
        let current_height = snapshot.current_height;

        let mut locked: Vec<LockedOutput> = snapshot
            .outputs
            .into_iter()
            .filter_map(|output| {
                let view = self.policy.evaluate(&output, current_height);
                view.is_locked.then_some(LockedOutput { output, view })
            })
            .collect();

        sort_locked(&mut locked, current_height);
        locked
    }

    pub fn balance(&self) -> Balance {
        let Some(snapshot) = self.read_snapshot() else {
            return Balance::default();
        };

        snapshot
            .outputs
            .iter()
            .fold(Balance::default(), |mut balance, output| {
                let (class, view) = self.inspect(output, snapshot.current_height);
                // Foreign outputs are listed when locked but never counted
                if !class.is_recognized() {
                    return balance;
                }
                if view.is_locked {
                    balance.locked = balance.locked.saturating_add(output.value);
                } else if view.is_confirmed {
                    balance.spendable = balance.spendable.saturating_add(output.value);
                } else {
                    balance.immature = balance.immature.saturating_add(output.value);
                }
                balance
            })
    }

    fn inspect(&self, output: &UnspentOutput, current_height: u32) -> (OutputClass, ConfirmationView) {
        (
            self.markers.classify(output.reserve_tag()),
            self.policy.evaluate(output, current_height),
        )
    }

    fn read_snapshot(&self) -> Option<ChainSnapshot> {
        match self.storage.snapshot() {
            Ok(Some(snapshot)) => Some(snapshot),
            Ok(None) => {
                log::debug!("Wallet not synced, no outputs to report");
                None
            }
            Err(e) => {
                log::warn!("⚠️  Failed to read chain snapshot: {}", e);
                None
            }
        }
    }
}
