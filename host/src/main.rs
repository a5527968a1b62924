//! `airdrop` CLI

use std::path::{Path, PathBuf};

use airdrop_core::{parse_fixed, to_hex, Identity};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use airdrop_host::artifact::{
    read_identity_tree, read_json, read_leaf_tree, write_json, CommitmentFile, ProofFile,
};
use airdrop_host::logging::{self, LogLevel};
use airdrop_host::{simulate, AirdropConfig, ClaimOutcome, EventLog, MerkleTree};

#[derive(Parser)]
#[command(name = "airdrop")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the Merkle root for an eligible set
    Build {
        /// JSON array of hex addresses
        #[arg(long, conflicts_with = "leaves", required_unless_present = "leaves")]
        eligible: Option<PathBuf>,

        /// JSON array of precomputed hex leaf hashes
        #[arg(long)]
        leaves: Option<PathBuf>,

        /// Override the configured reward
        #[arg(long)]
        reward: Option<u64>,

        /// Write the commitment here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Produce the proof for one address
    Prove {
        #[arg(long)]
        eligible: PathBuf,

        /// Hex address of the claimant
        #[arg(long)]
        identity: String,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check a proof against a published commitment
    Verify {
        #[arg(long)]
        commitment: PathBuf,

        #[arg(long)]
        proof: PathBuf,
    },

    /// Scan an event log, commit to it and let every account try to claim
    Simulate {
        /// JSON array of `{ account, block_number }` events
        #[arg(long)]
        events: PathBuf,

        /// Extra hex address to attempt a claim for; repeatable
        #[arg(long = "identity")]
        identities: Vec<String>,

        #[arg(long)]
        reward: Option<u64>,

        #[arg(long)]
        from_block: Option<u64>,

        #[arg(long)]
        cutoff_block: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AirdropConfig::load(path)?,
        None => AirdropConfig::default(),
    };
    logging::try_init(LogLevel::from_verbose(cli.verbose, config.log_level))?;

    match cli.command {
        Commands::Build {
            eligible,
            leaves,
            reward,
            out,
        } => {
            let tree = match (eligible, leaves) {
                (Some(path), None) => read_identity_tree(&path)?,
                (None, Some(path)) => read_leaf_tree(&path)?,
                _ => bail!("pass exactly one of --eligible or --leaves"),
            };
            let commitment = CommitmentFile::from_tree(&tree, reward.unwrap_or(config.reward_amount));
            info!(root = %commitment.root, leaves = commitment.leaf_count, "Commitment ready");
            emit(out.as_deref(), &commitment)?;
        }

        Commands::Prove {
            eligible,
            identity,
            out,
        } => {
            let tree: MerkleTree = read_identity_tree(&eligible)?;
            let identity: Identity = parse_fixed(&identity)?;
            let proof = tree
                .prove_membership(&identity)
                .with_context(|| format!("no proof for {}", to_hex(&identity)))?;
            emit(out.as_deref(), &ProofFile::new(&identity, &proof))?;
        }

        Commands::Verify { commitment, proof } => {
            let commitment = read_json::<CommitmentFile>(&commitment)?.commitment()?;
            let request = read_json::<ProofFile>(&proof)?.verify_against(&commitment)?;
            println!("valid: {} may claim {}", to_hex(&request.identity), commitment.reward_amount);
        }

        Commands::Simulate {
            events,
            identities,
            reward,
            from_block,
            cutoff_block,
        } => {
            let config = AirdropConfig {
                reward_amount: reward.unwrap_or(config.reward_amount),
                from_block: from_block.unwrap_or(config.from_block),
                cutoff_block: cutoff_block.unwrap_or(config.cutoff_block),
                ..config
            };
            config.validate()?;
            let log: EventLog = read_json(&events)?;
            let requested = identities
                .iter()
                .map(|raw| parse_fixed::<20>(raw))
                .collect::<airdrop_core::Result<Vec<_>>>()?;

            let report = simulate(&log, &config, &requested)?;
            for claimant in &report.claimants {
                match claimant.outcome {
                    ClaimOutcome::Claimed { amount } => {
                        println!("{}  claimed {amount}", to_hex(&claimant.identity))
                    }
                    ClaimOutcome::NotEligible => {
                        println!("{}  not eligible", to_hex(&claimant.identity))
                    }
                }
            }
            println!(
                "root {}  claimed {}/{}  disbursed {}",
                report.root, report.claimed, report.eligible, report.disbursed
            );
        }
    }

    Ok(())
}

fn emit<T: serde::Serialize>(out: Option<&Path>, value: &T) -> Result<()> {
    match out {
        Some(path) => write_json(path, value),
        None => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
    }
}
