//! Scene segment model
//!
//! A scene is a flat, ordered list of timed audio events: the hand-off
//! artifact between the generator and the renderer. Segments are immutable
//! once emitted; the renderer consumes the list exactly once.
//!
//! Wire format (one entry per segment):
//!
//! ```json
//! { "start": 20.0, "end": 23.4, "channel": 2,
//!   "kind": "file", "path": "1/utt_0005.wav", "clip_offset": 0.0 }
//! ```
//!
//! ```json
//! { "start": 0.0, "end": 30.0, "channel": 0,
//!   "kind": "generator",
//!   "generator_params": { "color": "white", "rms": 0.05, "seed": 17 } }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::structure::NoiseParams;

/// Output channel index (zero-based)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChannelId(pub u16);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameters for procedural segment synthesis
///
/// The `seed` is assigned by the generator (derived from the master seed) so
/// that the renderer synthesizes the same samples on every run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSpec {
    #[serde(flatten)]
    pub noise: NoiseParams,

    /// Seed for this segment's sample stream
    pub seed: u64,
}

/// Payload of a scene segment: where its samples come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    /// Samples copied from an external source clip
    File {
        /// Clip path, relative to the configured audio root
        path: String,

        /// Offset into the source clip, in seconds
        #[serde(default)]
        clip_offset: f64,
    },

    /// Samples synthesized procedurally
    Generator { generator_params: GeneratorSpec },
}

/// One placed audio event
///
/// `start` and `end` are absolute seconds from the scene origin with
/// `end > start`; `channel` is the output channel the samples land on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSegment {
    pub start: f64,
    pub end: f64,
    pub channel: ChannelId,

    #[serde(flatten)]
    pub payload: Payload,
}

impl SceneSegment {
    /// Segment duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// End time of a scene: the maximum segment end, 0.0 for an empty scene
pub fn scene_end(segments: &[SceneSegment]) -> f64 {
    segments.iter().map(|s| s.end).fold(0.0, f64::max)
}

/// Channel count implied by a scene: highest targeted channel + 1
pub fn implied_channel_count(segments: &[SceneSegment]) -> u16 {
    segments
        .iter()
        .map(|s| s.channel.0 + 1)
        .max()
        .unwrap_or(0)
}

/// Load a scene segment list from a JSON file
pub fn read_scene_file(path: &Path) -> Result<Vec<SceneSegment>> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|e| Error::Scene(e.to_string()))
}

/// Write a scene segment list as pretty-printed JSON
pub fn write_scene_file(path: &Path, segments: &[SceneSegment]) -> Result<()> {
    let json = serde_json::to_string_pretty(segments)
        .map_err(|e| Error::Scene(e.to_string()))?;
    std::fs::write(path, json)?;
    Ok(())
}
