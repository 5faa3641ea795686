//! Structure Builder (mpss-st) - Main entry point
//!
//! Generates a randomized scenario structure file modelling independent
//! conversations at a number of tables, suitable as input for mpss-sg.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mpss_sg::builder::{cafe_structure, PhaseControls};

/// Command-line arguments for mpss-st
#[derive(Parser, Debug)]
#[command(name = "mpss-st")]
#[command(about = "Randomized structure builder for MPSS")]
#[command(version)]
struct Args {
    /// Structure file to write
    #[arg(short = 'o', long, env = "MPSS_STRUCTURE")]
    out: PathBuf,

    /// Session duration in seconds
    #[arg(short, long, default_value_t = 1800.0)]
    duration: f64,

    /// Speakers per table
    #[arg(short, long, value_delimiter = ',', default_values_t = [4u32, 4, 4])]
    tables: Vec<u32>,

    /// Disable phase segmentation of large tables
    #[arg(long)]
    no_segment: bool,

    /// Scale of the exponential phase-length distribution, seconds
    #[arg(long, default_value_t = 600.0)]
    half_life: f64,

    /// Minimum phase length, seconds
    #[arg(long, default_value_t = 30.0)]
    min_phase: f64,

    /// Random seed
    #[arg(long, env = "MPSS_SEED", default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mpss_sg=info,mpss_st=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    if args.tables.is_empty() || args.tables.contains(&0) {
        anyhow::bail!("every table needs at least one speaker");
    }

    let controls = PhaseControls {
        half_life: args.half_life,
        min_phase: args.min_phase,
    };
    let mut rng = StdRng::seed_from_u64(args.seed);

    let structure = cafe_structure(
        &args.tables,
        args.duration,
        (!args.no_segment).then_some(&controls),
        &mut rng,
    );

    std::fs::write(&args.out, structure.to_json())
        .with_context(|| format!("Failed to write structure {}", args.out.display()))?;
    info!("Wrote structure to {}", args.out.display());

    Ok(())
}
