use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    to_hex, verify_claim, AirdropError, ClaimLedger, ClaimReceipt, ClaimRequest, ClaimState,
    Commitment, Hash, Identity, Result, RewardTransfer,
};

/// A fixed root and reward, plus the ledger that pays each identity once
pub struct AirdropInstance {
    commitment: Commitment,
    ledger: ClaimLedger,
    rewards: Arc<dyn RewardTransfer>,
}

impl AirdropInstance {
    /// Create an instance from a published root. Ledger records are created
    /// lazily as claims commit.
    pub fn new(merkle_root: Hash, reward_amount: u64, rewards: Arc<dyn RewardTransfer>) -> Self {
        Self::with_ledger(merkle_root, reward_amount, ClaimLedger::new(), rewards)
    }

    /// Create an instance with an `Unclaimed` record for every eligible identity
    pub fn with_eligible(
        merkle_root: Hash,
        reward_amount: u64,
        eligible: impl IntoIterator<Item = Identity>,
        rewards: Arc<dyn RewardTransfer>,
    ) -> Self {
        let ledger = ClaimLedger::with_identities(eligible);
        Self::with_ledger(merkle_root, reward_amount, ledger, rewards)
    }

    fn with_ledger(
        merkle_root: Hash,
        reward_amount: u64,
        ledger: ClaimLedger,
        rewards: Arc<dyn RewardTransfer>,
    ) -> Self {
        info!(
            root = %to_hex(&merkle_root),
            reward_amount,
            known = ledger.len(),
            "Airdrop committed"
        );
        Self {
            commitment: Commitment {
                merkle_root,
                reward_amount,
            },
            ledger,
            rewards,
        }
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    pub fn root(&self) -> &Hash {
        &self.commitment.merkle_root
    }

    pub fn reward_amount(&self) -> u64 {
        self.commitment.reward_amount
    }

    /// Check a proof against the stored root without touching the ledger
    pub fn check_proof(&self, identity: &Identity, proof: &[Hash]) -> bool {
        verify_claim(identity, proof, self.root())
    }

    /// Redeem the reward for `identity`. A repeat claim is rejected before the
    /// proof is checked.
    pub fn claim(&self, identity: &Identity, proof: &[Hash]) -> Result<ClaimReceipt> {
        let who = to_hex(identity);

        if self.ledger.has_claimed(identity) {
            debug!(identity = %who, "Claim rejected: already claimed");
            return Err(AirdropError::AlreadyClaimed);
        }

        if !self.check_proof(identity, proof) {
            debug!(identity = %who, proof_len = proof.len(), "Claim rejected: invalid proof");
            return Err(AirdropError::InvalidProof);
        }

        let amount = self.reward_amount();
        if !self.ledger.try_mark_claimed(identity, amount) {
            debug!(identity = %who, "Claim rejected: lost race to a concurrent claim");
            return Err(AirdropError::AlreadyClaimed);
        }

        self.rewards.transfer(identity, amount);
        info!(identity = %who, amount, "Airdrop claimed");

        Ok(ClaimReceipt {
            identity: *identity,
            amount,
        })
    }

    pub fn submit(&self, request: &ClaimRequest) -> Result<ClaimReceipt> {
        self.claim(&request.identity, &request.merkle_proof)
    }

    pub fn has_claimed(&self, identity: &Identity) -> bool {
        self.ledger.has_claimed(identity)
    }

    pub fn claim_state(&self, identity: &Identity) -> ClaimState {
        self.ledger.state(identity)
    }

    pub fn claimed_count(&self) -> usize {
        self.ledger.claimed_count()
    }

    pub fn total_disbursed(&self) -> u128 {
        self.ledger.total_disbursed()
    }
}

impl fmt::Debug for AirdropInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirdropInstance")
            .field("commitment", &self.commitment)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}
