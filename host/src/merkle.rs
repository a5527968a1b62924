use airdrop_core::{compute_leaf, hash_pair, parse_fixed, to_hex, AirdropError, Hash, Identity, Result};
use tracing::debug;

/// A Merkle tree over the eligible addresses.
///
/// Leaves are sorted and deduplicated before the first level is built, and
/// pairs are hashed in byte order, so the root depends only on the leaf set.
/// An odd node at the end of a level is carried up unchanged.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// Levels bottom-up. `layers[0]` holds the sorted leaves, the last layer
    /// holds only the root.
    layers: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a Merkle tree from a list of addresses
    pub fn from_identities(identities: &[Identity]) -> Result<Self> {
        let leaves = identities.iter().map(compute_leaf).collect();
        Self::from_leaves(leaves)
    }

    /// Build from hex-encoded leaf hashes. Every value must be 32 bytes.
    pub fn from_hex_leaves<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        let leaves = values
            .iter()
            .map(|value| parse_fixed::<32>(value.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::from_leaves(leaves)
    }

    /// Build from pre-hashed leaves
    pub fn from_leaves(mut leaves: Vec<Hash>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(AirdropError::MalformedInput(
                "cannot build tree from empty leaf set".into(),
            ));
        }

        let supplied = leaves.len();
        leaves.sort_unstable();
        leaves.dedup();
        if leaves.len() < supplied {
            debug!(dropped = supplied - leaves.len(), "Dropped duplicate leaves");
        }

        let mut layers = vec![leaves];
        while layers[layers.len() - 1].len() > 1 {
            let next = Self::next_level(&layers[layers.len() - 1]);
            layers.push(next);
        }

        let tree = MerkleTree { layers };
        debug!(
            leaves = tree.leaf_count(),
            height = tree.height(),
            root = %to_hex(&tree.root()),
            "Built merkle tree"
        );
        Ok(tree)
    }

    fn next_level(level: &[Hash]) -> Vec<Hash> {
        level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_pair(left, right),
                // Odd node, carried forward
                [odd] => *odd,
                _ => unreachable!("chunks(2) yields one or two nodes"),
            })
            .collect()
    }

    /// Get the root hash
    pub fn root(&self) -> Hash {
        self.layers[self.layers.len() - 1][0]
    }

    /// Number of distinct leaves
    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Number of levels above the leaves
    pub fn height(&self) -> usize {
        self.layers.len() - 1
    }

    /// Sorted leaves
    pub fn leaves(&self) -> &[Hash] {
        &self.layers[0]
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.layers[0].binary_search(&compute_leaf(identity)).is_ok()
    }

    /// Get the Merkle proof for an address
    pub fn prove_membership(&self, identity: &Identity) -> Result<Vec<Hash>> {
        self.prove_leaf(&compute_leaf(identity))
    }

    /// Get the Merkle proof for a leaf hash.
    ///
    /// Levels where the node was carried forward contribute no sibling.
    pub fn prove_leaf(&self, leaf: &Hash) -> Result<Vec<Hash>> {
        let mut index = self.layers[0]
            .binary_search(leaf)
            .map_err(|_| AirdropError::NotEligible)?;

        let mut proof = Vec::with_capacity(self.height());
        for level in &self.layers[..self.height()] {
            if let Some(sibling) = level.get(index ^ 1) {
                proof.push(*sibling);
            }
            index /= 2;
        }

        Ok(proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrop_core::verify_claim;

    #[test]
    fn test_merkle_tree_single() {
        let addresses = vec![[1u8; 20]];
        let tree = MerkleTree::from_identities(&addresses).unwrap();
        assert_eq!(tree.root(), compute_leaf(&[1u8; 20]));
        assert_eq!(tree.height(), 0);
        assert!(tree.prove_membership(&[1u8; 20]).unwrap().is_empty());
    }

    #[test]
    fn test_merkle_tree_empty() {
        let err = MerkleTree::from_identities(&[]).unwrap_err();
        assert!(matches!(err, AirdropError::MalformedInput(_)));
    }

    #[test]
    fn test_merkle_tree_multiple() {
        let addresses = vec![[1u8; 20], [2u8; 20], [3u8; 20], [4u8; 20]];
        let tree = MerkleTree::from_identities(&addresses).unwrap();

        let mut leaves: Vec<Hash> = addresses.iter().map(compute_leaf).collect();
        leaves.sort();
        let expected = hash_pair(
            &hash_pair(&leaves[0], &leaves[1]),
            &hash_pair(&leaves[2], &leaves[3]),
        );
        assert_eq!(tree.root(), expected);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_odd_node_carried_forward() {
        let addresses = vec![[1u8; 20], [2u8; 20], [3u8; 20]];
        let tree = MerkleTree::from_identities(&addresses).unwrap();

        let mut leaves: Vec<Hash> = addresses.iter().map(compute_leaf).collect();
        leaves.sort();
        let pair = hash_pair(&leaves[0], &leaves[1]);
        assert_eq!(tree.root(), hash_pair(&pair, &leaves[2]));

        // The carried leaf skips a level, so its proof is one entry short
        assert_eq!(tree.prove_leaf(&leaves[2]).unwrap(), vec![pair]);
        assert_eq!(tree.prove_leaf(&leaves[0]).unwrap(), vec![leaves[1], leaves[2]]);
    }

    #[test]
    fn test_merkle_proof() {
        let addresses: Vec<Identity> = (1..=7u8).map(|i| [i; 20]).collect();
        let tree = MerkleTree::from_identities(&addresses).unwrap();

        for address in &addresses {
            let proof = tree.prove_membership(address).unwrap();
            assert!(proof.len() <= tree.height());
            assert!(
                verify_claim(address, &proof, &tree.root()),
                "Proof for {:?} should be valid",
                address
            );
        }
    }

    #[test]
    fn test_not_eligible() {
        let tree = MerkleTree::from_identities(&[[1u8; 20], [2u8; 20]]).unwrap();
        assert!(!tree.contains(&[3u8; 20]));
        assert_eq!(tree.prove_membership(&[3u8; 20]), Err(AirdropError::NotEligible));
    }

    #[test]
    fn test_duplicates_are_deduplicated() {
        let tree = MerkleTree::from_identities(&[[1u8; 20], [2u8; 20], [1u8; 20]]).unwrap();
        let clean = MerkleTree::from_identities(&[[1u8; 20], [2u8; 20]]).unwrap();
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.root(), clean.root());
    }

    #[test]
    fn test_hex_leaves() {
        let leaf = compute_leaf(&[1u8; 20]);
        let tree = MerkleTree::from_hex_leaves(&[to_hex(&leaf)]).unwrap();
        assert_eq!(tree.root(), leaf);

        let err = MerkleTree::from_hex_leaves(&["0xdeadbeef"]).unwrap_err();
        assert!(matches!(err, AirdropError::MalformedInput(_)));
    }
}
