//! Scene generation
//!
//! Recursive interpretation of a structure tree into a flat, time-stamped
//! segment list. The walk is accumulator-passing: every visit receives the
//! cursor, the active speaker set and the node's tree path, and returns the
//! advanced cursor. Segments are appended to one output list in recursion
//! order, so equal inputs and an equal seed reproduce the scene
//! byte-for-byte.
//!
//! Timeline rules:
//! - A sequence threads one cursor through its children in order.
//! - Splitter branches all start at the splitter's entry cursor, each with
//!   its own fresh per-branch state; the splitter releases its parent's
//!   timeline only at the maximum branch end.
//! - A conversation consumes exactly its declared duration on the parent
//!   timeline regardless of the jitter its turns carry internally.
//! - A pause advances the cursor and emits nothing.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use mpss_common::params::{ChannelMap, GeneratorParams};
use mpss_common::scene::{GeneratorSpec, Payload, SceneSegment};
use mpss_common::structure::{SpeakerId, StructureNode};

use crate::clips::ClipSource;
use crate::error::{GenerateError, Result};
use crate::policy::{policy_from_params, TurnPolicy};

/// Remainders below this many seconds snap onto a conversation's end
/// boundary instead of seating another turn. Far below one sample at any
/// practical rate (1 / 192 kHz ≈ 5.2e-6 s).
const SNAP_EPS: f64 = 1e-6;

/// Scene generator
///
/// Owns the walk state: the seeded rng, the turn policy and the channel
/// assignment. The clip source is borrowed for the duration of a run.
pub struct SceneGenerator<'a, S: ClipSource> {
    clips: &'a mut S,
    policy: Box<dyn TurnPolicy>,
    channels: ChannelMap,
    rng: StdRng,
}

impl<'a, S: ClipSource> SceneGenerator<'a, S> {
    /// Create a generator with the policy selected by `params`
    pub fn new(params: &GeneratorParams, clips: &'a mut S) -> Self {
        Self::with_policy(params, clips, policy_from_params(&params.turns))
    }

    /// Create a generator with a caller-supplied turn policy
    pub fn with_policy(
        params: &GeneratorParams,
        clips: &'a mut S,
        policy: Box<dyn TurnPolicy>,
    ) -> Self {
        SceneGenerator {
            clips,
            policy,
            channels: params.channels.clone(),
            rng: StdRng::seed_from_u64(params.seed),
        }
    }

    /// Generate the scene segment list for a structure tree
    ///
    /// The tree is validated first; generation is all-or-nothing, no partial
    /// scene survives an error.
    pub fn generate(&mut self, root: &StructureNode) -> Result<Vec<SceneSegment>> {
        if let Err(e) = root.validate() {
            let message = match e {
                mpss_common::Error::Structure(m) => m,
                other => other.to_string(),
            };
            let (path, detail) = match message.split_once(": ") {
                Some((p, d)) => (p.to_string(), d.to_string()),
                None => ("root".to_string(), message),
            };
            return Err(GenerateError::Structure {
                path,
                message: detail,
            });
        }

        let mut segments = Vec::new();
        let scope = BTreeSet::new();
        let end = self.visit(root, 0.0, &scope, "root", &mut segments)?;
        info!(segments = segments.len(), end_time = end, "scene generated");
        Ok(segments)
    }

    fn visit(
        &mut self,
        node: &StructureNode,
        cursor: f64,
        scope: &BTreeSet<SpeakerId>,
        path: &str,
        out: &mut Vec<SceneSegment>,
    ) -> Result<f64> {
        match node {
            StructureNode::Pause { duration } => {
                debug!(path, duration, "pause");
                Ok(cursor + duration)
            }

            StructureNode::Noise { duration, params } => {
                debug!(path, duration, "noise");
                out.push(SceneSegment {
                    start: cursor,
                    end: cursor + duration,
                    channel: self.channels.noise_channel(),
                    payload: Payload::Generator {
                        generator_params: GeneratorSpec {
                            noise: *params,
                            seed: self.rng.gen(),
                        },
                    },
                });
                Ok(cursor + duration)
            }

            StructureNode::Sequence { speakers, elements } => {
                debug!(path, children = elements.len(), "sequence");
                let scope = narrow(scope, speakers);
                let mut cursor = cursor;
                for (i, child) in elements.iter().enumerate() {
                    let child_path = format!("{path}/elements[{i}]");
                    cursor = self.visit(child, cursor, &scope, &child_path, out)?;
                }
                Ok(cursor)
            }

            StructureNode::Splitter { elements } => {
                debug!(path, branches = elements.len(), "splitter");
                let start = cursor;
                let mut end = start;
                for (i, child) in elements.iter().enumerate() {
                    let child_path = format!("{path}/elements[{i}]");
                    let branch_end = self.visit(child, start, scope, &child_path, out)?;
                    end = end.max(branch_end);
                }
                Ok(end)
            }

            StructureNode::Conversation { speakers, duration } => {
                let effective = narrow(scope, speakers);
                if effective.len() < 2 {
                    return Err(GenerateError::Structure {
                        path: path.to_string(),
                        message: format!(
                            "only {} of the conversation's speakers are in scope",
                            effective.len()
                        ),
                    });
                }
                self.expand_conversation(&effective, *duration, cursor, path, out)
            }
        }
    }

    /// Expand a conversation into per-speaker turns filling `[cursor,
    /// cursor + duration)` exactly
    fn expand_conversation(
        &mut self,
        speakers: &BTreeSet<SpeakerId>,
        duration: f64,
        cursor: f64,
        path: &str,
        out: &mut Vec<SceneSegment>,
    ) -> Result<f64> {
        let conv_start = cursor;
        let conv_end = cursor + duration;
        let min_turn = self.policy.min_turn();

        let required = speakers.len() as f64 * min_turn;
        if duration < required {
            return Err(GenerateError::DurationConflict {
                path: path.to_string(),
                requested: duration,
                required,
            });
        }

        debug!(
            path,
            duration,
            speakers = speakers.len(),
            "expanding conversation"
        );

        let order: Vec<SpeakerId> = speakers.iter().copied().collect();
        let mut last_speaker: Option<SpeakerId> = None;
        let mut last_end: BTreeMap<SpeakerId, f64> = BTreeMap::new();
        let mut last_index: Option<usize> = None;
        let mut local = conv_start;

        while conv_end - local > SNAP_EPS {
            let speaker = self.policy.next_speaker(&order, last_speaker, &mut self.rng);
            let clip = self.clips.next_clip(speaker, min_turn).ok_or_else(|| {
                GenerateError::InsufficientSource {
                    path: path.to_string(),
                    speaker,
                    min_len: min_turn,
                }
            })?;
            let jitter = self.policy.jitter(&mut self.rng);

            let turn_start = if last_index.is_none() {
                // The opening turn anchors the conversation to its start
                conv_start
            } else {
                let mut start = (local + jitter).max(conv_start);
                if let Some(&own_end) = last_end.get(&speaker) {
                    // A speaker never overlaps their own previous turn
                    start = start.max(own_end);
                }
                if conv_end - start <= SNAP_EPS {
                    // A gap draw overshot the boundary: the closing turn
                    // starts flush with the previous turn instead
                    start = local;
                }
                start
            };

            // The final turn is truncated to land exactly on the boundary
            let turn_end = (turn_start + clip.duration).min(conv_end);

            out.push(SceneSegment {
                start: turn_start,
                end: turn_end,
                channel: self.channels.speaker_channel(speaker),
                payload: Payload::File {
                    path: clip.path,
                    clip_offset: 0.0,
                },
            });
            last_index = Some(out.len() - 1);
            last_end.insert(speaker, turn_end);
            last_speaker = Some(speaker);
            local = turn_end;
        }

        // Sub-sample remainder snaps onto the boundary
        if let Some(i) = last_index {
            out[i].end = conv_end;
        }
        Ok(conv_end)
    }
}

/// Restrict the active speaker set by a node's declared set
///
/// An empty declared set inherits the scope unchanged; a declared set only
/// restricts, it never introduces speakers the parent does not carry.
fn narrow(scope: &BTreeSet<SpeakerId>, declared: &BTreeSet<SpeakerId>) -> BTreeSet<SpeakerId> {
    if declared.is_empty() {
        scope.clone()
    } else if scope.is_empty() {
        declared.clone()
    } else {
        declared.intersection(scope).copied().collect()
    }
}
