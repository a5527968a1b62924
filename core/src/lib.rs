mod airdrop;
mod error;
mod ledger;
mod transfer;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use airdrop::AirdropInstance;
pub use error::{AirdropError, Result};
pub use ledger::{ClaimLedger, ClaimState};
pub use transfer::{BalanceBook, RewardTransfer};

/// Participant identifier (20-byte account address)
pub type Identity = [u8; 20];

/// Output of the hash primitive; used for leaves, internal nodes and the root
pub type Hash = [u8; 32];

/// Published, read-only view of an airdrop instance
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Commitment {
    /// Merkle root over the eligible identities
    pub merkle_root: Hash,
    /// Fixed amount paid out per successful claim
    pub reward_amount: u64,
}

/// A claim submitted by a participant
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimRequest {
    /// Claimant's address
    pub identity: Identity,
    /// Sibling hashes from leaf to root
    pub merkle_proof: Vec<Hash>,
}

/// Returned for a claim that committed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimReceipt {
    /// Identity that was paid
    pub identity: Identity,
    /// Amount authorized for transfer
    pub amount: u64,
}

fn finish(hasher: Sha256) -> Hash {
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute a leaf hash from an address
pub fn compute_leaf(identity: &Identity) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(identity);
    finish(hasher)
}

/// Combine two nodes into their parent.
///
/// The pair is ordered byte-wise before hashing, so `hash_pair(a, b)` equals
/// `hash_pair(b, a)` and proofs carry no left/right bits.
pub fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(first);
    hasher.update(second);
    finish(hasher)
}

/// Verify a Merkle proof for an already hashed leaf.
///
/// An empty proof is accepted only when the leaf is the root itself.
pub fn verify_merkle_proof(leaf: &Hash, proof: &[Hash], root: &Hash) -> bool {
    let computed = proof
        .iter()
        .fold(*leaf, |node, sibling| hash_pair(&node, sibling));
    computed == *root
}

/// Verify that `identity` is committed to by `root`
pub fn verify_claim(identity: &Identity, proof: &[Hash], root: &Hash) -> bool {
    verify_merkle_proof(&compute_leaf(identity), proof, root)
}

/// `0x`-prefixed lowercase hex, used in logs and artefacts
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a fixed-width value from hex, with or without `0x`.
///
/// A value of the wrong width is rejected as `MalformedInput`.
pub fn parse_fixed<const N: usize>(value: &str) -> Result<[u8; N]> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(digits)
        .map_err(|e| AirdropError::MalformedInput(format!("invalid hex {value:?}: {e}")))?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        AirdropError::MalformedInput(format!(
            "expected {N} bytes, got {} in {value:?}",
            bytes.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_pair_is_symmetric() {
        let left = [1u8; 32];
        let right = [2u8; 32];
        assert_eq!(hash_pair(&left, &right), hash_pair(&right, &left));
        assert_ne!(hash_pair(&left, &right), [0u8; 32]);
    }

    #[test]
    fn test_hash_pair_orders_bytewise() {
        let low = [0u8; 32];
        let mut high = [0u8; 32];
        high[31] = 1;

        let mut hasher = Sha256::new();
        hasher.update(low);
        hasher.update(high);
        let expected = finish(hasher);

        assert_eq!(hash_pair(&high, &low), expected);
    }

    #[test]
    fn test_compute_leaf() {
        let leaf = compute_leaf(&[1u8; 20]);
        assert_eq!(leaf, compute_leaf(&[1u8; 20]));
        assert_ne!(leaf, compute_leaf(&[2u8; 20]));
    }

    #[test]
    fn test_empty_proof_matches_only_leaf_root() {
        let identity = [7u8; 20];
        let leaf = compute_leaf(&identity);
        assert!(verify_claim(&identity, &[], &leaf));
        assert!(!verify_claim(&[8u8; 20], &[], &leaf));
    }

    #[test]
    fn test_two_leaf_proof() {
        let a = [1u8; 20];
        let b = [2u8; 20];
        let root = hash_pair(&compute_leaf(&a), &compute_leaf(&b));

        assert!(verify_claim(&a, &[compute_leaf(&b)], &root));
        assert!(verify_claim(&b, &[compute_leaf(&a)], &root));
        assert!(!verify_claim(&a, &[compute_leaf(&a)], &root));
    }

    #[test]
    fn test_parse_fixed() {
        let identity: Identity = parse_fixed("0x0101010101010101010101010101010101010101").unwrap();
        assert_eq!(identity, [1u8; 20]);
        assert_eq!(to_hex(&identity), "0x0101010101010101010101010101010101010101");

        let short = parse_fixed::<32>("abcd");
        assert!(matches!(short, Err(AirdropError::MalformedInput(_))));
        let garbage = parse_fixed::<20>("0xzz");
        assert!(matches!(garbage, Err(AirdropError::MalformedInput(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn proptest_hash_pair_commutes(a in any::<Hash>(), b in any::<Hash>()) {
            prop_assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
        }

        #[test]
        fn proptest_flipped_sibling_fails(
            identity in any::<Identity>(),
            siblings in proptest::collection::vec(any::<Hash>(), 1..12),
            entry in any::<prop::sample::Index>(),
            byte in 0usize..32,
            mask in 1u8..=255,
        ) {
            let root = siblings
                .iter()
                .fold(compute_leaf(&identity), |node, sibling| hash_pair(&node, sibling));
            prop_assert!(verify_claim(&identity, &siblings, &root));

            let mut tampered = siblings.clone();
            let slot = entry.index(tampered.len());
            tampered[slot][byte] ^= mask;
            prop_assert!(!verify_claim(&identity, &tampered, &root));
        }
    }
}
