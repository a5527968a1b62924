use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::Identity;

/// Observable state of one identity
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClaimState {
    #[default]
    Unclaimed,
    /// Terminal
    Claimed { amount: u64 },
}

impl ClaimState {
    pub fn is_claimed(&self) -> bool {
        matches!(self, Self::Claimed { .. })
    }

    fn amount(&self) -> u64 {
        match self {
            Self::Unclaimed => 0,
            Self::Claimed { amount } => *amount,
        }
    }
}

type ClaimRecord = Mutex<ClaimState>;

/// Tracks which identities have redeemed.
///
/// The map is write-locked only to insert a missing record; each transition
/// happens under the record's own lock.
#[derive(Debug, Default)]
pub struct ClaimLedger {
    records: RwLock<HashMap<Identity, Arc<ClaimRecord>>>,
}

impl ClaimLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register an `Unclaimed` record for every known identity
    pub fn with_identities(identities: impl IntoIterator<Item = Identity>) -> Self {
        let records = identities
            .into_iter()
            .map(|identity| (identity, Arc::new(ClaimRecord::default())))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn has_claimed(&self, identity: &Identity) -> bool {
        self.records
            .read()
            .get(identity)
            .is_some_and(|record| record.lock().is_claimed())
    }

    pub fn state(&self, identity: &Identity) -> ClaimState {
        self.records
            .read()
            .get(identity)
            .map_or(ClaimState::Unclaimed, |record| *record.lock())
    }

    /// Atomically move `identity` to `Claimed`, recording `amount`.
    ///
    /// Returns false if another caller already made the transition.
    pub(crate) fn try_mark_claimed(&self, identity: &Identity, amount: u64) -> bool {
        let record = self.record(identity);
        let mut state = record.lock();
        if state.is_claimed() {
            return false;
        }
        *state = ClaimState::Claimed { amount };
        true
    }

    fn record(&self, identity: &Identity) -> Arc<ClaimRecord> {
        if let Some(record) = self.records.read().get(identity) {
            return Arc::clone(record);
        }
        let mut records = self.records.write();
        Arc::clone(records.entry(*identity).or_default())
    }

    /// Number of records, claimed or not
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn claimed_count(&self) -> usize {
        self.records
            .read()
            .values()
            .filter(|record| record.lock().is_claimed())
            .count()
    }

    /// Sum of all recorded disbursements
    pub fn total_disbursed(&self) -> u128 {
        self.records
            .read()
            .values()
            .map(|record| u128::from(record.lock().amount()))
            .sum()
    }
}
