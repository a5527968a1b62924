use thiserror::Error;

/// Errors raised while building a commitment or redeeming a claim
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AirdropError {
    /// No leaf exists for the identity
    #[error("Identity is not eligible for this airdrop")]
    NotEligible,

    /// The proof does not rebuild the committed root
    #[error("Incorrect merkle proof")]
    InvalidProof,

    /// The identity already redeemed its reward
    #[error("Already claimed air drop")]
    AlreadyClaimed,

    /// Construction-time input that cannot be committed to
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

impl AirdropError {
    /// Only a bad proof can succeed on a later attempt
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::InvalidProof)
    }
}

pub type Result<T> = std::result::Result<T, AirdropError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriable() {
        assert!(AirdropError::InvalidProof.is_retriable());
        assert!(!AirdropError::AlreadyClaimed.is_retriable());
        assert!(!AirdropError::NotEligible.is_retriable());
        assert!(!AirdropError::MalformedInput("empty".into()).is_retriable());
    }

    #[test]
    fn test_messages() {
        assert_eq!(AirdropError::InvalidProof.to_string(), "Incorrect merkle proof");
        assert_eq!(AirdropError::AlreadyClaimed.to_string(), "Already claimed air drop");
        assert_eq!(
            AirdropError::MalformedInput("empty leaf set".into()).to_string(),
            "Malformed input: empty leaf set"
        );
    }
}
