//! Source clip pools
//!
//! The generator only ever asks "next clip for speaker S of at least length
//! L"; where clips come from lives behind the [`ClipSource`] trait. The
//! provided [`ClipPool`] is backed by a clip index file: a JSON object
//! mapping speaker ids to their clip lists:
//!
//! ```json
//! {
//!     "1": [ { "path": "1/utt_0001.wav", "duration": 3.2 },
//!            { "path": "1/utt_0002.wav", "duration": 5.1 } ],
//!     "2": [ { "path": "2/utt_0001.wav", "duration": 2.8 } ]
//! }
//! ```
//!
//! Paths are relative to an audio root resolved at render time.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use mpss_common::structure::SpeakerId;
use mpss_common::{Error, Result};

/// One source clip available to a speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Path relative to the configured audio root
    pub path: String,

    /// Clip length in seconds
    pub duration: f64,
}

/// Supplies source clips for conversation turns
pub trait ClipSource {
    /// Next clip for `speaker` with duration >= `min_len`
    ///
    /// Returns None when the pool cannot satisfy the request at all, which
    /// aborts generation.
    fn next_clip(&mut self, speaker: SpeakerId, min_len: f64) -> Option<Clip>;
}

/// Per-speaker inventory with a position cursor
#[derive(Debug, Clone)]
struct SpeakerClips {
    clips: Vec<Clip>,
    cursor: usize,
}

/// Clip pool over a per-speaker clip index
///
/// Walks each speaker's clip list in order, skipping clips shorter than the
/// requested minimum, and wraps around when the list runs out — recorded
/// inventories are shorter than the scenes built from them. A full cycle
/// without a long-enough clip means the request cannot be satisfied.
#[derive(Debug, Clone, Default)]
pub struct ClipPool {
    speakers: BTreeMap<SpeakerId, SpeakerClips>,
}

impl ClipPool {
    /// Build a pool from a speaker -> clips index
    ///
    /// Clip lists are sorted by path so that pool behavior does not depend
    /// on index file ordering.
    pub fn from_index(index: BTreeMap<SpeakerId, Vec<Clip>>) -> ClipPool {
        let speakers = index
            .into_iter()
            .map(|(speaker, mut clips)| {
                clips.sort_by(|a, b| a.path.cmp(&b.path));
                (speaker, SpeakerClips { clips, cursor: 0 })
            })
            .collect();
        ClipPool { speakers }
    }

    /// Load a pool from a clip index JSON file
    pub fn from_index_file(path: &Path) -> Result<ClipPool> {
        let json = std::fs::read_to_string(path)?;
        let index: BTreeMap<SpeakerId, Vec<Clip>> = serde_json::from_str(&json)
            .map_err(|e| Error::Config(format!("clip index {}: {e}", path.display())))?;
        Ok(ClipPool::from_index(index))
    }

    /// Number of clips available for a speaker
    pub fn clip_count(&self, speaker: SpeakerId) -> usize {
        self.speakers
            .get(&speaker)
            .map(|s| s.clips.len())
            .unwrap_or(0)
    }
}

impl ClipSource for ClipPool {
    fn next_clip(&mut self, speaker: SpeakerId, min_len: f64) -> Option<Clip> {
        let entry = self.speakers.get_mut(&speaker)?;
        if entry.clips.is_empty() {
            return None;
        }

        // At most one full cycle through the inventory per request
        for _ in 0..entry.clips.len() {
            if entry.cursor >= entry.clips.len() {
                warn!(%speaker, "clip inventory exhausted, wrapping");
                entry.cursor = 0;
            }
            let clip = &entry.clips[entry.cursor];
            entry.cursor += 1;
            if clip.duration >= min_len {
                return Some(clip.clone());
            }
        }
        None
    }
}
