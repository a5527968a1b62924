use std::path::Path;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::artifact::read_json;
use crate::eligibility::BlockRange;
use crate::logging::LogLevel;

/// Settings for building and running one airdrop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirdropConfig {
    /// Amount credited per successful claim
    pub reward_amount: u64,
    /// First block whose qualifying events count (inclusive)
    pub from_block: u64,
    /// Last block whose qualifying events count (inclusive)
    pub cutoff_block: u64,
    pub log_level: LogLevel,
}

impl Default for AirdropConfig {
    fn default() -> Self {
        Self {
            reward_amount: 500,
            from_block: 1,
            cutoff_block: 11,
            log_level: LogLevel::Info,
        }
    }
}

impl AirdropConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reward_amount == 0 {
            bail!("reward_amount must be greater than zero");
        }
        if self.cutoff_block < self.from_block {
            bail!(
                "cutoff_block {} is before from_block {}",
                self.cutoff_block,
                self.from_block
            );
        }
        Ok(())
    }

    pub fn block_range(&self) -> BlockRange {
        BlockRange {
            from_block: self.from_block,
            cutoff_block: self.cutoff_block,
        }
    }
}
