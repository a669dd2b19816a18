//! Headless match runner.
//!
//! Simulates a self-playing beach volleyball match through the core JSON
//! API and prints the summary document. Useful for balance sweeps and for
//! eyeballing determinism: the same seed always prints the same summary.

use anyhow::Result;
use clap::Parser;
use serde_json::{json, Value};

use bv_core::simulate_match_json;

#[derive(Parser)]
#[command(name = "bv_cli")]
#[command(about = "Run a headless beach volleyball match simulation", long_about = None)]
struct Cli {
    /// RNG seed; reruns with the same seed are identical
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulated match length in seconds
    #[arg(long, default_value_t = 60)]
    duration_secs: u64,

    /// Tick length in milliseconds
    #[arg(long, default_value_t = 16.0)]
    tick_ms: f64,

    /// Left roster key (unknown keys fall back to the default character)
    #[arg(long)]
    left: Option<String>,

    /// Right roster key
    #[arg(long)]
    right: Option<String>,

    /// Pretty-print the summary
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut request = json!({
        "schema_version": 1,
        "seed": cli.seed,
        "duration_ms": cli.duration_secs * 1_000,
        "tick_ms": cli.tick_ms,
    });
    if let Some(left) = &cli.left {
        request["left_character"] = json!(left);
    }
    if let Some(right) = &cli.right {
        request["right_character"] = json!(right);
    }

    let summary = simulate_match_json(&request.to_string())?;

    if cli.pretty {
        let value: Value = serde_json::from_str(&summary)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}
