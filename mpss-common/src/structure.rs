//! Scenario structure model
//!
//! Typed tree representation of a multi-party scenario. Nodes are pure data:
//! parsing and structural validation live here, interpretation lives in the
//! scene generator.
//!
//! A structure file is a nested JSON document; each node carries a `type` tag
//! (`sequence`, `splitter`, `conversation`, `noise`, `pause`) and the fields
//! for that type:
//!
//! ```json
//! {
//!     "type": "sequence",
//!     "speakers": [1, 2, 3],
//!     "elements": [
//!         { "type": "pause", "duration": 20.0 },
//!         { "type": "conversation", "speakers": [1, 2, 3], "duration": 120.0 }
//!     ]
//! }
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Speaker identifier
///
/// Speakers are numbered from 1, matching the convention that speaker *s*
/// occupies output channel *s* (channel 0 is reserved for noise).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SpeakerId(pub u32);

impl fmt::Display for SpeakerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spectral color of synthesized noise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoiseColor {
    /// Flat spectrum
    #[default]
    White,
    /// 1/f spectrum (Voss-McCartney synthesis)
    Pink,
}

/// Parameters for a synthetic noise segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    /// Spectral color of the noise
    #[serde(default)]
    pub color: NoiseColor,

    /// Target RMS level of the generated signal (linear, full scale = 1.0)
    #[serde(default = "default_noise_rms")]
    pub rms: f64,
}

fn default_noise_rms() -> f64 {
    0.05
}

impl Default for NoiseParams {
    fn default() -> Self {
        NoiseParams {
            color: NoiseColor::default(),
            rms: default_noise_rms(),
        }
    }
}

/// One node of the scenario structure tree
///
/// Durations are seconds. A node's declared duration (explicit for the leaf
/// kinds, sum / max of children for `Sequence` / `Splitter`) is the
/// authoritative time it consumes on its parent's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StructureNode {
    /// Children consumed one after another along a single shared timeline
    Sequence {
        /// Speakers active for this subtree; empty = inherit from the parent
        #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
        speakers: BTreeSet<SpeakerId>,
        elements: Vec<StructureNode>,
    },

    /// Children start at the same offset and run on independent timelines;
    /// the splitter completes only when every branch has completed
    Splitter { elements: Vec<StructureNode> },

    /// A timed unit expanded into per-speaker turns filling exactly `duration`
    Conversation {
        speakers: BTreeSet<SpeakerId>,
        duration: f64,
    },

    /// A single synthetic-signal segment on the noise channel
    Noise {
        duration: f64,
        #[serde(default)]
        params: NoiseParams,
    },

    /// Silence: consumes time, emits nothing
    Pause { duration: f64 },
}

impl StructureNode {
    /// Parse a structure tree from a JSON string and validate it
    pub fn from_json(json: &str) -> Result<StructureNode> {
        let node: StructureNode = serde_json::from_str(json)
            .map_err(|e| Error::Structure(e.to_string()))?;
        node.validate()?;
        Ok(node)
    }

    /// Load a structure tree from a JSON file and validate it
    pub fn from_file(path: &Path) -> Result<StructureNode> {
        let json = std::fs::read_to_string(path)?;
        StructureNode::from_json(&json)
    }

    /// Serialize the tree to pretty-printed JSON
    pub fn to_json(&self) -> String {
        // StructureNode serialization cannot fail: no maps with non-string
        // keys, no non-finite floats after validation
        serde_json::to_string_pretty(self).expect("structure serialization")
    }

    /// Structural validation
    ///
    /// Checks, per node: `elements` non-empty for sequence/splitter, at least
    /// 2 speakers per conversation, durations finite and non-negative.
    /// Cross-node consistency (e.g. one speaker in two concurrent splitter
    /// branches) is deliberately not enforced here.
    pub fn validate(&self) -> Result<()> {
        self.validate_at("root")
    }

    fn validate_at(&self, path: &str) -> Result<()> {
        match self {
            StructureNode::Sequence { elements, .. }
            | StructureNode::Splitter { elements } => {
                if elements.is_empty() {
                    return Err(Error::Structure(format!(
                        "{path}: elements must not be empty"
                    )));
                }
                for (i, child) in elements.iter().enumerate() {
                    child.validate_at(&format!("{path}/elements[{i}]"))?;
                }
                Ok(())
            }
            StructureNode::Conversation { speakers, duration } => {
                if speakers.len() < 2 {
                    return Err(Error::Structure(format!(
                        "{path}: conversation needs at least 2 speakers, got {}",
                        speakers.len()
                    )));
                }
                check_duration(*duration, path)
            }
            StructureNode::Noise { duration, params } => {
                if !params.rms.is_finite() || params.rms < 0.0 {
                    return Err(Error::Structure(format!(
                        "{path}: noise rms must be finite and non-negative"
                    )));
                }
                check_duration(*duration, path)
            }
            StructureNode::Pause { duration } => check_duration(*duration, path),
        }
    }

    /// Declared duration of this node in seconds
    ///
    /// Leaf kinds report their explicit duration; a sequence reports the sum
    /// of its children, a splitter the maximum over its children.
    pub fn duration(&self) -> f64 {
        match self {
            StructureNode::Sequence { elements, .. } => {
                elements.iter().map(StructureNode::duration).sum()
            }
            StructureNode::Splitter { elements } => elements
                .iter()
                .map(StructureNode::duration)
                .fold(0.0, f64::max),
            StructureNode::Conversation { duration, .. }
            | StructureNode::Noise { duration, .. }
            | StructureNode::Pause { duration } => *duration,
        }
    }
}

fn check_duration(duration: f64, path: &str) -> Result<()> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(Error::Structure(format!(
            "{path}: duration must be finite and non-negative, got {duration}"
        )));
    }
    Ok(())
}
