//! Scene Renderer (mpss-sr) - Main entry point
//!
//! Takes a scene file, renders it into a multichannel sample buffer and
//! writes the result as a WAV file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mpss_common::params::ParamsFile;
use mpss_common::scene::read_scene_file;
use mpss_sr::render::render;
use mpss_sr::source::WavClipReader;

/// Command-line arguments for mpss-sr
#[derive(Parser, Debug)]
#[command(name = "mpss-sr")]
#[command(about = "Scene renderer for MPSS")]
#[command(version)]
struct Args {
    /// Scene file to render
    #[arg(short = 's', long, env = "MPSS_SCENE")]
    scene: PathBuf,

    /// Output WAV file
    #[arg(short = 'o', long, env = "MPSS_AUDIO_OUT")]
    out: PathBuf,

    /// Root folder source clip paths resolve against
    #[arg(short = 'a', long, env = "MPSS_AUDIO_ROOT")]
    audio_root: PathBuf,

    /// Parameter file (TOML)
    #[arg(short = 'p', long, env = "MPSS_PARAMS")]
    params: Option<PathBuf>,

    /// Output sample rate, overriding the parameter file
    #[arg(long, env = "MPSS_SAMPLE_RATE")]
    sample_rate: Option<u32>,

    /// Output channel count, overriding the scene-derived count
    #[arg(long)]
    channels: Option<u16>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mpss_sr=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut params = ParamsFile::load(args.params.as_deref())
        .context("Failed to load parameters")?;
    if let Some(sample_rate) = args.sample_rate {
        params.render.sample_rate = sample_rate;
    }
    if let Some(channels) = args.channels {
        params.render.channel_count = Some(channels);
    }
    params.render.validate().context("Invalid render parameters")?;

    let segments = read_scene_file(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    info!("Rendering {} segments", segments.len());

    let clips = WavClipReader::new(&args.audio_root);
    let buffer = render(&segments, &params.render, &clips).context("Rendering failed")?;
    if buffer.channels() == 0 {
        anyhow::bail!("scene is empty, nothing to write");
    }

    let spec = hound::WavSpec {
        channels: buffer.channels(),
        sample_rate: params.render.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&args.out, spec)
        .with_context(|| format!("Failed to create {}", args.out.display()))?;
    for sample in buffer.interleaved() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    info!(
        "Wrote {:.1}s of {}-channel audio to {}",
        buffer.duration_seconds(params.render.sample_rate),
        buffer.channels(),
        args.out.display()
    );

    Ok(())
}
