//! mortal-sim - run scripted damage scenarios
//!
//! Resolves every hit in a scenario file and prints one JSON report per hit.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use mortal::scenario::{self, Scenario};
use mortal::ResolverConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Damage scenario simulator
#[derive(Parser, Debug)]
#[command(
    name = "mortal-sim",
    version,
    about = "Resolve a scripted sequence of hits against one entity"
)]
struct Args {
    /// Scenario TOML file
    scenario: PathBuf,

    /// Resolver config TOML (MORTAL_* environment variables still apply)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixed seed for durability and knockback rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mortal=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            ResolverConfig::load(path)?
        }
        None => ResolverConfig::from_env()?,
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    if !args.scenario.exists() {
        bail!("Scenario file not found: {}", args.scenario.display());
    }
    let scenario = Scenario::load(&args.scenario)?;

    for report in scenario::run(&scenario, config)? {
        println!("{}", serde_json::to_string(&report)?);
    }

    Ok(())
}
