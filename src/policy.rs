//! Confirmation depth and time-lock policy
//!
//! One total function decides everything for an output at a given chain
//! height. Every combination of missing fields has a defined answer:
//!
//! - `is_confirmed`: mined, at least `threshold` blocks deep
//!   (`block_height <= current - threshold + 1`), and past its lock
//!   (`current > unlocked_height`) when it has one.
//! - `is_locked`: has a lock and `current <= unlocked_height`.
//! - `lock_months_remaining`: informational only. Months are floored and
//!   clamped at zero; they never decide `is_locked`.

use std::cmp::Ordering;

use crate::network::NetworkParams;
use crate::output::UnspentOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfirmationView {
    pub is_confirmed: bool,
    pub is_locked: bool,
    pub lock_months_remaining: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub confirmation_threshold: u32,
    pub blocks_per_month: u32,
}

impl ConfirmationPolicy {
    pub fn new(confirmation_threshold: u32, blocks_per_month: u32) -> Self {
        Self {
            confirmation_threshold,
            blocks_per_month,
        }
    }

    pub fn for_network(params: &NetworkParams, confirmation_threshold: u32) -> Self {
        Self::new(confirmation_threshold, params.blocks_per_month)
    }

    pub fn evaluate(&self, output: &UnspentOutput, current_height: u32) -> ConfirmationView {
        let current = i64::from(current_height);

        let deep_enough = output.block_height.map_or(false, |height| {
            i64::from(height) <= current - i64::from(self.confirmation_threshold) + 1
        });
        let lock_expired = output
            .unlocked_height
            .map_or(true, |unlock| current > i64::from(unlock));
        let is_locked = output
            .unlocked_height
            .map_or(false, |unlock| current <= i64::from(unlock));

        let lock_months_remaining = match output.unlocked_height {
            Some(unlock) if is_locked => {
                // Unconfirmed outputs are treated as mined now for display
                let observed = i64::from(output.block_height.unwrap_or(current_height));
                let remaining = (i64::from(unlock) - observed).max(0);
                remaining
                    .checked_div(i64::from(self.blocks_per_month))
                    .map_or(0, |months| months as u32)
            }
            _ => 0,
        };

        ConfirmationView {
            is_confirmed: deep_enough && lock_expired,
            is_locked,
            lock_months_remaining,
        }
    }
}

/// A locked output together with its view, as listed for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedOutput {
    pub output: UnspentOutput,
    pub view: ConfirmationView,
}

/// Display order for locked outputs
///
/// Newest block first, then fewest months remaining, then outpoint so the
/// order never depends on how storage happened to return the outputs.
/// Unconfirmed outputs sort as if mined at `current_height`.
pub fn sort_locked(locked: &mut [LockedOutput], current_height: u32) {
    locked.sort_by(|a, b| compare_locked(a, b, current_height));
}

fn compare_locked(a: &LockedOutput, b: &LockedOutput, current_height: u32) -> Ordering {
    let height_a = a.output.block_height.unwrap_or(current_height);
    let height_b = b.output.block_height.unwrap_or(current_height);

    height_b
        .cmp(&height_a)
        .then(a.view.lock_months_remaining.cmp(&b.view.lock_months_remaining))
        .then(a.output.outpoint.cmp(&b.output.outpoint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::hashes::Hash;
    use bitcoin::{OutPoint, Txid};

    const MONTH: u32 = 86_400;

    fn output(vout: u32) -> UnspentOutput {
        UnspentOutput::new(OutPoint::new(Txid::all_zeros(), vout), 1_000)
    }

    fn policy(threshold: u32) -> ConfirmationPolicy {
        ConfirmationPolicy::new(threshold, MONTH)
    }

    #[test]
    fn test_depth_rule_boundaries() {
        let policy = policy(3);
        // 1000 - 3 + 1 = 998
        assert!(policy.evaluate(&output(0).mined_at(997), 1000).is_confirmed);
        assert!(policy.evaluate(&output(0).mined_at(998), 1000).is_confirmed);
        assert!(!policy.evaluate(&output(0).mined_at(999), 1000).is_confirmed);
    }

    #[test]
    fn test_unconfirmed_never_confirmed() {
        for threshold in [0, 1, 6, 100] {
            for current in [0, 1, 1_000_000] {
                let view = policy(threshold).evaluate(&output(0), current);
                assert!(!view.is_confirmed);

                let view = policy(threshold).evaluate(&output(0).locked_until(0), current);
                assert!(!view.is_confirmed);
            }
        }
    }

    #[test]
    fn test_lock_must_expire_before_spendable() {
        let out = output(0).mined_at(500).locked_until(1000);
        let view = policy(1).evaluate(&out, 1000);
        assert!(!view.is_confirmed);
        assert!(view.is_locked);

        let view = policy(1).evaluate(&out, 1001);
        assert!(view.is_confirmed);
        assert!(!view.is_locked);
    }

    #[test]
    fn test_lock_boundary() {
        let out = output(0).mined_at(10).locked_until(5_000);
        assert!(policy(1).evaluate(&out, 4_999).is_locked);
        assert!(policy(1).evaluate(&out, 5_000).is_locked);
        assert!(!policy(1).evaluate(&out, 5_001).is_locked);
    }

    #[test]
    fn test_threshold_larger_than_height() {
        let view = policy(10).evaluate(&output(0).mined_at(0), 5);
        assert!(!view.is_confirmed);
    }

    #[test]
    fn test_months_remaining_floor() {
        let out = output(0).mined_at(1_000).locked_until(1_000 + 3 * MONTH - 1);
        let view = policy(1).evaluate(&out, 1_000);
        assert_eq!(view.lock_months_remaining, 2);

        let out = output(0).mined_at(1_000).locked_until(1_000 + 3 * MONTH);
        assert_eq!(policy(1).evaluate(&out, 1_000).lock_months_remaining, 3);
    }

    #[test]
    fn test_months_measured_from_block_height() {
        // Current height moves on but the count is anchored at the mined height
        let out = output(0).mined_at(0).locked_until(12 * MONTH);
        assert_eq!(policy(1).evaluate(&out, 5 * MONTH).lock_months_remaining, 12);
    }

    #[test]
    fn test_months_for_unconfirmed_use_current_height() {
        let out = output(0).locked_until(2 * MONTH);
        let view = policy(1).evaluate(&out, MONTH);
        assert_eq!(view.lock_months_remaining, 1);
        assert!(!view.is_confirmed);
    }

    #[test]
    fn test_months_clamped_and_do_not_unlock() {
        // Mined after its own unlock height, still locked by height comparison
        let out = output(0).mined_at(900).locked_until(800);
        let view = policy(1).evaluate(&out, 800);
        assert!(view.is_locked);
        assert_eq!(view.lock_months_remaining, 0);
    }

    #[test]
    fn test_unlocked_outputs_report_zero_months() {
        let out = output(0).mined_at(0).locked_until(10);
        assert_eq!(policy(1).evaluate(&out, 11).lock_months_remaining, 0);
        assert_eq!(policy(1).evaluate(&output(0).mined_at(5), 11).lock_months_remaining, 0);
    }

    #[test]
    fn test_sort_locked_order() {
        let policy = policy(1);
        let current = 100;
        let make = |out: UnspentOutput| LockedOutput {
            view: policy.evaluate(&out, current),
            output: out,
        };

        let mut locked = vec![
            make(output(0).mined_at(50).locked_until(50 + 5 * MONTH)),
            make(output(1).mined_at(90).locked_until(90 + 2 * MONTH)),
            make(output(2).mined_at(50).locked_until(50 + MONTH)),
            make(output(3).locked_until(100 + MONTH)),
            make(output(4).mined_at(50).locked_until(50 + MONTH)),
        ];
        sort_locked(&mut locked, current);

        let order: Vec<u32> = locked.iter().map(|l| l.output.outpoint.vout).collect();
        assert_eq!(order, vec![3, 1, 2, 4, 0]);
    }
}
