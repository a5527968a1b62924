use std::fs;
use std::path::Path;

use airdrop_core::{
    parse_fixed, to_hex, verify_claim, AirdropError, ClaimRequest, Commitment, Hash, Identity,
};
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::eligibility::EligibilitySource;
use crate::merkle::MerkleTree;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut raw = serde_json::to_string_pretty(value)?;
    raw.push('\n');
    fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
}

/// Read a JSON array of hex addresses
pub fn read_identities(path: &Path) -> Result<Vec<Identity>> {
    let raw: Vec<String> = read_json(path)?;
    raw.iter()
        .map(|value| parse_fixed::<20>(value))
        .collect::<airdrop_core::Result<Vec<_>>>()
        .with_context(|| format!("decoding identities in {}", path.display()))
}

/// Build the tree for a JSON array of hex addresses. Repeats are dropped.
pub fn read_identity_tree(path: &Path) -> Result<MerkleTree> {
    let identities = read_identities(path)?.eligible();
    MerkleTree::from_identities(&identities)
        .with_context(|| format!("building tree from {}", path.display()))
}

/// Build the tree for a JSON array of hex leaf hashes
pub fn read_leaf_tree(path: &Path) -> Result<MerkleTree> {
    let raw: Vec<String> = read_json(path)?;
    MerkleTree::from_hex_leaves(&raw)
        .with_context(|| format!("building tree from {}", path.display()))
}

/// The published root and reward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentFile {
    pub root: String,
    pub reward_amount: u64,
    pub leaf_count: usize,
}

impl CommitmentFile {
    pub fn from_tree(tree: &MerkleTree, reward_amount: u64) -> Self {
        Self {
            root: to_hex(&tree.root()),
            reward_amount,
            leaf_count: tree.leaf_count(),
        }
    }

    pub fn commitment(&self) -> airdrop_core::Result<Commitment> {
        Ok(Commitment {
            merkle_root: parse_fixed::<32>(&self.root)?,
            reward_amount: self.reward_amount,
        })
    }
}

/// A claimant's proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofFile {
    pub identity: String,
    pub proof: Vec<String>,
}

impl ProofFile {
    pub fn new(identity: &Identity, proof: &[Hash]) -> Self {
        Self {
            identity: to_hex(identity),
            proof: proof.iter().map(|sibling| to_hex(sibling)).collect(),
        }
    }

    pub fn request(&self) -> airdrop_core::Result<ClaimRequest> {
        Ok(ClaimRequest {
            identity: parse_fixed::<20>(&self.identity)?,
            merkle_proof: self
                .proof
                .iter()
                .map(|sibling| parse_fixed::<32>(sibling))
                .collect::<airdrop_core::Result<_>>()?,
        })
    }

    /// Decode and check against a published commitment
    pub fn verify_against(&self, commitment: &Commitment) -> airdrop_core::Result<ClaimRequest> {
        let request = self.request()?;
        if !verify_claim(&request.identity, &request.merkle_proof, &commitment.merkle_root) {
            return Err(AirdropError::InvalidProof);
        }
        Ok(request)
    }
}

/// `#[serde(with)]` adapter writing an identity as hex
pub(crate) mod hex_identity {
    use airdrop_core::{parse_fixed, to_hex, Identity};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(identity: &Identity, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(identity))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Identity, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_fixed(&raw).map_err(D::Error::custom)
    }
}
