//! Scene Generator (mpss-sg) - Main entry point
//!
//! Instantiates a scenario structure file into a scene file: the flat,
//! time-stamped segment list the renderer consumes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mpss_common::params::ParamsFile;
use mpss_common::scene::write_scene_file;
use mpss_common::structure::StructureNode;
use mpss_sg::clips::ClipPool;
use mpss_sg::generator::SceneGenerator;

/// Command-line arguments for mpss-sg
#[derive(Parser, Debug)]
#[command(name = "mpss-sg")]
#[command(about = "Scene generator for MPSS")]
#[command(version)]
struct Args {
    /// Structure file to instantiate
    #[arg(short = 's', long, env = "MPSS_STRUCTURE")]
    structure: PathBuf,

    /// Clip index file (speaker -> clips)
    #[arg(short = 'c', long, env = "MPSS_CLIP_INDEX")]
    clips: PathBuf,

    /// Scene file to write
    #[arg(short = 'o', long, env = "MPSS_SCENE")]
    scene: PathBuf,

    /// Parameter file (TOML)
    #[arg(short = 'p', long, env = "MPSS_PARAMS")]
    params: Option<PathBuf>,

    /// Random seed, overriding the parameter file
    #[arg(long, env = "MPSS_SEED")]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mpss_sg=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut params = ParamsFile::load(args.params.as_deref())
        .context("Failed to load parameters")?;
    if let Some(seed) = args.seed {
        params.generator.seed = seed;
    }

    info!(
        "Instantiating {} to make {}",
        args.structure.display(),
        args.scene.display()
    );

    let structure = StructureNode::from_file(&args.structure)
        .with_context(|| format!("Failed to load structure {}", args.structure.display()))?;

    let mut pool = ClipPool::from_index_file(&args.clips)
        .with_context(|| format!("Failed to load clip index {}", args.clips.display()))?;

    let segments = SceneGenerator::new(&params.generator, &mut pool)
        .generate(&structure)
        .context("Scene generation failed")?;

    write_scene_file(&args.scene, &segments)
        .with_context(|| format!("Failed to write scene {}", args.scene.display()))?;
    info!("Wrote {} segments to {}", segments.len(), args.scene.display());

    Ok(())
}
