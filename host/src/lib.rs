pub mod artifact;
pub mod config;
pub mod eligibility;
pub mod logging;
pub mod merkle;
pub mod simulate;

pub use config::AirdropConfig;
pub use eligibility::{BlockRange, EligibilitySource, EventLog, QualifyingEvent};
pub use merkle::MerkleTree;
pub use simulate::{simulate, ClaimOutcome, ClaimantReport, SimulationReport};
