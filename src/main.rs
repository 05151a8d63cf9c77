//! Card Gate CLI
//!
//! Runs a batch of card form submissions through the decision engine and
//! prints one decision row per submission.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- pools.csv submissions.csv > decisions.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity
//! - `CARD_GATE_TODAY`: Reference date (`YYYY-MM-DD`), defaults to today in UTC
//! - `CARD_GATE_STORE`: CSV file holding the latest status per purchase kind
//! - `CARD_GATE_PRICE`: Amount recorded with each settled purchase
//! - `CARD_GATE_MAX_YEARS`: How many years ahead an expiry year may lie

use card_gate::{CardPools, DecisionEngine, GateConfig, GateError, PurchaseKind, Result};
use log::info;
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        return Err(GateError::MissingArgument);
    }

    let config = GateConfig::from_env()?;
    let pools = CardPools::from_csv(BufReader::new(File::open(&args[1])?))?;
    let submissions = BufReader::new(File::open(&args[2])?);

    let engine = DecisionEngine::from_config(pools, &config);

    let stdout = io::stdout();
    let handle = stdout.lock();
    engine.process_csv(submissions, handle)?;

    for kind in PurchaseKind::ALL {
        let status = engine
            .status(kind)?
            .map(|s| s.to_string())
            .unwrap_or_else(|| "NONE".to_string());
        info!("Final {} status: {}", kind, status);
    }

    Ok(())
}
