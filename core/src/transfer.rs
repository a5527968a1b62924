use std::collections::HashMap;

use parking_lot::Mutex;

use crate::Identity;

/// Moves the reward once a claim has committed.
///
/// The airdrop only authorizes; balance accounting is up to the implementor.
pub trait RewardTransfer: Send + Sync {
    fn transfer(&self, identity: &Identity, amount: u64);
}

/// In-memory balances, credited by successful claims
#[derive(Debug, Default)]
pub struct BalanceBook {
    balances: Mutex<HashMap<Identity, u64>>,
}

impl BalanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, identity: &Identity) -> u64 {
        self.balances.lock().get(identity).copied().unwrap_or(0)
    }

    /// Number of accounts holding a balance
    pub fn holders(&self) -> usize {
        self.balances.lock().len()
    }

    pub fn total(&self) -> u128 {
        self.balances.lock().values().map(|v| u128::from(*v)).sum()
    }
}

impl RewardTransfer for BalanceBook {
    fn transfer(&self, identity: &Identity, amount: u64) {
        let mut balances = self.balances.lock();
        let balance = balances.entry(*identity).or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}
