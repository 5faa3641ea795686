//! Generation and rendering parameters
//!
//! Every knob the tools recognize lives in an explicit parameter structure
//! passed into `generate` / `render` — there is no ambient configuration
//! state. Binaries resolve values in priority order: CLI flag > environment
//! variable > TOML file > compiled default.
//!
//! A TOML parameter file holds one table per tool:
//!
//! ```toml
//! [generator]
//! seed = 42
//!
//! [generator.turns]
//! selection = "random-no-repeat"
//! min_turn = 1.0
//! max_overlap = 0.25
//! max_gap = 0.25
//!
//! [render]
//! sample_rate = 16000
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::scene::ChannelId;
use crate::structure::SpeakerId;

/// How the next turn's speaker is chosen within a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Uniform random choice excluding the previous speaker
    #[default]
    RandomNoRepeat,
    /// Speakers take turns in id order
    RoundRobin,
}

/// Turn-taking policy knobs for conversation expansion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnTakingParams {
    /// Speaker selection discipline
    pub selection: SelectionPolicy,

    /// Minimum turn length in seconds; also the minimum clip length the
    /// generator requests from the pool
    pub min_turn: f64,

    /// Maximum overlap between adjacent turns, seconds
    pub max_overlap: f64,

    /// Maximum gap between adjacent turns, seconds
    pub max_gap: f64,
}

impl Default for TurnTakingParams {
    fn default() -> Self {
        TurnTakingParams {
            selection: SelectionPolicy::default(),
            min_turn: 1.0,
            max_overlap: 0.25,
            max_gap: 0.25,
        }
    }
}

impl TurnTakingParams {
    pub fn validate(&self) -> Result<()> {
        if !self.min_turn.is_finite() || self.min_turn <= 0.0 {
            return Err(Error::Config(format!(
                "turns.min_turn must be > 0, got {}",
                self.min_turn
            )));
        }
        for (name, value) in [
            ("turns.max_overlap", self.max_overlap),
            ("turns.max_gap", self.max_gap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.max_overlap >= self.min_turn {
            return Err(Error::Config(format!(
                "turns.max_overlap ({}) must be smaller than turns.min_turn ({})",
                self.max_overlap, self.min_turn
            )));
        }
        Ok(())
    }
}

/// Speaker-to-channel assignment
///
/// Default convention: speaker *s* renders on channel *s*, leaving channel 0
/// for noise. Individual speakers can be remapped via `overrides`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelMap {
    /// Channel noise segments render on
    pub noise_channel: u16,

    /// Per-speaker channel overrides (speaker id -> channel)
    pub overrides: BTreeMap<u32, u16>,
}

impl Default for ChannelMap {
    fn default() -> Self {
        ChannelMap {
            noise_channel: 0,
            overrides: BTreeMap::new(),
        }
    }
}

impl ChannelMap {
    /// Output channel for a speaker
    pub fn speaker_channel(&self, speaker: SpeakerId) -> ChannelId {
        match self.overrides.get(&speaker.0) {
            Some(&channel) => ChannelId(channel),
            None => ChannelId(speaker.0 as u16),
        }
    }

    /// Output channel for noise segments
    pub fn noise_channel(&self) -> ChannelId {
        ChannelId(self.noise_channel)
    }
}

/// Scene generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneratorParams {
    /// Master random seed; every random draw during generation derives from
    /// it, so equal seeds reproduce scenes byte-for-byte
    pub seed: u64,

    /// Turn-taking policy
    pub turns: TurnTakingParams,

    /// Channel assignment
    pub channels: ChannelMap,
}

impl GeneratorParams {
    pub fn validate(&self) -> Result<()> {
        self.turns.validate()
    }
}

/// Scene rendering parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderParams {
    /// Output sample rate in Hz
    pub sample_rate: u32,

    /// Output channel count; None derives it from the scene
    /// (highest targeted channel + 1)
    pub channel_count: Option<u16>,
}

impl Default for RenderParams {
    fn default() -> Self {
        RenderParams {
            sample_rate: 16_000,
            channel_count: None,
        }
    }
}

impl RenderParams {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::Config("render.sample_rate must be > 0".into()));
        }
        Ok(())
    }
}

/// Contents of an MPSS parameter file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParamsFile {
    pub generator: GeneratorParams,
    pub render: RenderParams,
}

impl ParamsFile {
    /// Load parameters from a TOML file, or compiled defaults when no path
    /// is given. Values are validated either way.
    pub fn load(path: Option<&Path>) -> Result<ParamsFile> {
        let params = match path {
            Some(path) => {
                debug!("loading parameters from {}", path.display());
                let text = std::fs::read_to_string(path)?;
                toml::from_str(&text).map_err(|e| {
                    Error::Config(format!("{}: {e}", path.display()))
                })?
            }
            None => ParamsFile::default(),
        };
        params.generator.validate()?;
        params.render.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ParamsFile::default();
        assert_eq!(params.generator.seed, 0);
        assert_eq!(params.generator.turns.min_turn, 1.0);
        assert_eq!(params.generator.turns.selection, SelectionPolicy::RandomNoRepeat);
        assert_eq!(params.render.sample_rate, 16_000);
        assert_eq!(params.render.channel_count, None);
        params.generator.validate().unwrap();
        params.render.validate().unwrap();
    }

    #[test]
    fn test_default_channel_map() {
        let map = ChannelMap::default();
        assert_eq!(map.noise_channel(), ChannelId(0));
        assert_eq!(map.speaker_channel(SpeakerId(1)), ChannelId(1));
        assert_eq!(map.speaker_channel(SpeakerId(12)), ChannelId(12));
    }

    #[test]
    fn test_channel_overrides() {
        let mut map = ChannelMap::default();
        map.overrides.insert(3, 7);
        assert_eq!(map.speaker_channel(SpeakerId(3)), ChannelId(7));
        assert_eq!(map.speaker_channel(SpeakerId(4)), ChannelId(4));
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mpss.toml");
        std::fs::write(
            &path,
            r#"
            [generator]
            seed = 42

            [generator.turns]
            selection = "round-robin"
            min_turn = 2.0
            max_overlap = 0.5

            [render]
            sample_rate = 44100
            channel_count = 13
            "#,
        )
        .unwrap();

        let params = ParamsFile::load(Some(&path)).unwrap();
        assert_eq!(params.generator.seed, 42);
        assert_eq!(params.generator.turns.selection, SelectionPolicy::RoundRobin);
        assert_eq!(params.generator.turns.min_turn, 2.0);
        assert_eq!(params.generator.turns.max_overlap, 0.5);
        // Unset fields keep their defaults
        assert_eq!(params.generator.turns.max_gap, 0.25);
        assert_eq!(params.render.sample_rate, 44_100);
        assert_eq!(params.render.channel_count, Some(13));
    }

    #[test]
    fn test_invalid_min_turn_rejected() {
        let mut params = GeneratorParams::default();
        params.turns.min_turn = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_overlap_must_stay_below_min_turn() {
        let mut params = GeneratorParams::default();
        params.turns.max_overlap = 1.5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let params = RenderParams {
            sample_rate: 0,
            channel_count: None,
        };
        assert!(params.validate().is_err());
    }
}
