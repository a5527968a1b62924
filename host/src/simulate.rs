use std::sync::Arc;

use airdrop_core::{to_hex, AirdropError, AirdropInstance, BalanceBook, Identity};
use anyhow::{bail, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::artifact::hex_identity;
use crate::config::AirdropConfig;
use crate::eligibility::{EligibilitySource, EventLog};
use crate::merkle::MerkleTree;

/// What one claimant got out of a replayed round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// Paid once; the repeat claim was rejected
    Claimed { amount: u64 },
    /// No proof exists; a bare claim was rejected
    NotEligible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClaimantReport {
    #[serde(with = "hex_identity")]
    pub identity: Identity,
    pub outcome: ClaimOutcome,
}

/// Summary of a replayed claim round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub root: String,
    pub eligible: usize,
    pub claimed: usize,
    pub disbursed: u128,
    pub claimants: Vec<ClaimantReport>,
}

/// Commit to the accounts with events inside the configured window, then
/// let every account in the log, plus `requested`, try to claim.
///
/// Eligible claimants claim twice and must be refused the second time;
/// everyone else claims with an empty proof and must be refused.
pub fn simulate(
    log: &EventLog,
    config: &AirdropConfig,
    requested: &[Identity],
) -> Result<SimulationReport> {
    let eligible = log.scan(config.block_range()).eligible();
    info!(
        events = log.len(),
        eligible = eligible.len(),
        from_block = config.from_block,
        cutoff_block = config.cutoff_block,
        "Scanned event log"
    );

    let tree = MerkleTree::from_identities(&eligible)?;
    let book = Arc::new(BalanceBook::new());
    let airdrop = AirdropInstance::with_eligible(
        tree.root(),
        config.reward_amount,
        eligible.iter().copied(),
        book.clone(),
    );

    let mut candidates = log.accounts();
    candidates.extend_from_slice(requested);

    let claimants = candidates
        .eligible()
        .into_iter()
        .map(|identity| {
            let outcome = replay(&tree, &airdrop, &identity)?;
            Ok(ClaimantReport { identity, outcome })
        })
        .collect::<Result<Vec<_>>>()?;

    if airdrop.claimed_count() != eligible.len() {
        warn!(
            claimed = airdrop.claimed_count(),
            eligible = eligible.len(),
            "Not every eligible account claimed"
        );
    }

    Ok(SimulationReport {
        root: to_hex(airdrop.root()),
        eligible: eligible.len(),
        claimed: airdrop.claimed_count(),
        disbursed: book.total(),
        claimants,
    })
}

fn replay(tree: &MerkleTree, airdrop: &AirdropInstance, identity: &Identity) -> Result<ClaimOutcome> {
    let who = to_hex(identity);
    match tree.prove_membership(identity) {
        Ok(proof) => {
            let receipt = airdrop.claim(identity, &proof)?;
            match airdrop.claim(identity, &proof) {
                Err(AirdropError::AlreadyClaimed) => {}
                other => bail!("second claim for {who} returned {other:?}"),
            }
            Ok(ClaimOutcome::Claimed {
                amount: receipt.amount,
            })
        }
        Err(AirdropError::NotEligible) => {
            match airdrop.claim(identity, &[]) {
                Err(AirdropError::InvalidProof) => {}
                other => bail!("ineligible {who} returned {other:?}"),
            }
            Ok(ClaimOutcome::NotEligible)
        }
        Err(e) => Err(e.into()),
    }
}
