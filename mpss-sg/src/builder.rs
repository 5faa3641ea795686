//! Randomized structure building
//!
//! Produces a structure tree modelling a café-style session: several tables,
//! each hosting an independent conversation for the whole session. Tables of
//! four or more speakers can optionally be segmented into alternating phases:
//! one conversation across the whole table, then two parallel conversations
//! between random sub-pairs, and so on, with exponentially distributed phase
//! lengths.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use mpss_common::structure::{SpeakerId, StructureNode};

/// Sub-second leftovers terminate phase splitting
const FILL_EPS: f64 = 1e-9;

/// Controls for segmenting a table's session into phases
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseControls {
    /// Scale of the exponential phase-length distribution, seconds
    pub half_life: f64,

    /// Imposed minimum phase length, seconds
    pub min_phase: f64,
}

impl Default for PhaseControls {
    fn default() -> Self {
        PhaseControls {
            half_life: 600.0,
            min_phase: 30.0,
        }
    }
}

/// Draw phase lengths that fill `duration` exactly
///
/// Lengths are exponentially distributed with an imposed minimum; the final
/// phase is clamped to the remaining time and may come out shorter.
pub fn exponential_phases(
    duration: f64,
    controls: &PhaseControls,
    rng: &mut StdRng,
) -> Vec<f64> {
    let mut phases = Vec::new();
    let mut total = 0.0;
    while duration - total > FILL_EPS {
        let draw = -controls.half_life * (1.0 - rng.gen::<f64>()).ln();
        let phase = draw.max(controls.min_phase);
        let remaining = duration - total;
        if phase >= remaining {
            phases.push(remaining);
            break;
        }
        phases.push(phase);
        total += phase;
    }
    phases
}

/// Assign consecutive speaker ids to tables
///
/// `[2, 3]` becomes `[{1, 2}, {3, 4, 5}]`.
pub fn speaker_groups(table_sizes: &[u32]) -> Vec<BTreeSet<SpeakerId>> {
    let mut groups = Vec::with_capacity(table_sizes.len());
    let mut next = 1u32;
    for &size in table_sizes {
        groups.push((next..next + size).map(SpeakerId).collect());
        next += size;
    }
    groups
}

/// One conversation phase: a single conversation, or a splitter of parallel
/// conversations when the phase has several speaker groups
fn conversation_phase(groups: &[BTreeSet<SpeakerId>], duration: f64) -> StructureNode {
    if groups.len() == 1 {
        StructureNode::Conversation {
            speakers: groups[0].clone(),
            duration,
        }
    } else {
        StructureNode::Splitter {
            elements: groups
                .iter()
                .map(|group| StructureNode::Conversation {
                    speakers: group.clone(),
                    duration,
                })
                .collect(),
        }
    }
}

/// Build the conversation pattern for one table
///
/// Tables with fewer than four speakers, or without phase controls, hold a
/// single conversation for the whole duration. Larger tables alternate
/// whole-table phases with phases split into two random sub-groups (a pair
/// and the rest).
pub fn make_table(
    speakers: &BTreeSet<SpeakerId>,
    duration: f64,
    controls: Option<&PhaseControls>,
    rng: &mut StdRng,
) -> StructureNode {
    let controls = match controls {
        Some(c) if speakers.len() >= 4 => c,
        _ => return conversation_phase(&[speakers.clone()], duration),
    };

    let durations = exponential_phases(duration, controls, rng);
    let mut phases = Vec::with_capacity(durations.len());
    for (i, &phase_duration) in durations.iter().enumerate() {
        let groups = if i % 2 == 0 {
            // Whole table together...
            vec![speakers.clone()]
        } else {
            // ...then two parallel sub-conversations
            let mut shuffled: Vec<SpeakerId> = speakers.iter().copied().collect();
            shuffled.shuffle(rng);
            let (pair, rest) = shuffled.split_at(2);
            vec![
                pair.iter().copied().collect(),
                rest.iter().copied().collect(),
            ]
        };
        phases.push(conversation_phase(&groups, phase_duration));
    }

    StructureNode::Sequence {
        speakers: speakers.clone(),
        elements: phases,
    }
}

/// Build a full session structure: parallel tables under one root sequence
pub fn cafe_structure(
    table_sizes: &[u32],
    duration: f64,
    controls: Option<&PhaseControls>,
    rng: &mut StdRng,
) -> StructureNode {
    let groups = speaker_groups(table_sizes);
    let all_speakers: BTreeSet<SpeakerId> =
        groups.iter().flat_map(|g| g.iter().copied()).collect();
    let tables = groups
        .iter()
        .map(|group| make_table(group, duration, controls, rng))
        .collect();

    StructureNode::Sequence {
        speakers: all_speakers,
        elements: vec![StructureNode::Splitter { elements: tables }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_phases_fill_duration_exactly() {
        let mut rng = StdRng::seed_from_u64(5);
        let controls = PhaseControls {
            half_life: 100.0,
            min_phase: 30.0,
        };
        let phases = exponential_phases(1800.0, &controls, &mut rng);
        assert!(!phases.is_empty());

        let total: f64 = phases.iter().sum();
        assert!((total - 1800.0).abs() < 1e-6, "total {total}");

        // Every phase except the clamped last one honors the minimum
        for &phase in &phases[..phases.len() - 1] {
            assert!(phase >= 30.0);
        }
    }

    #[test]
    fn test_speaker_groups_are_consecutive() {
        let groups = speaker_groups(&[2, 3]);
        let as_ids: Vec<Vec<u32>> = groups
            .iter()
            .map(|g| g.iter().map(|s| s.0).collect())
            .collect();
        assert_eq!(as_ids, [vec![1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn test_small_table_is_single_conversation() {
        let mut rng = StdRng::seed_from_u64(0);
        let speakers: BTreeSet<SpeakerId> = [1, 2, 3].map(SpeakerId).into();
        let node = make_table(&speakers, 600.0, Some(&PhaseControls::default()), &mut rng);
        assert!(matches!(node, StructureNode::Conversation { duration, .. } if duration == 600.0));
    }

    #[test]
    fn test_segmented_table_alternates_phases() {
        let mut rng = StdRng::seed_from_u64(9);
        let speakers: BTreeSet<SpeakerId> = [1, 2, 3, 4].map(SpeakerId).into();
        let controls = PhaseControls {
            half_life: 60.0,
            min_phase: 30.0,
        };
        let node = make_table(&speakers, 1800.0, Some(&controls), &mut rng);

        let elements = match &node {
            StructureNode::Sequence { elements, .. } => elements,
            other => panic!("expected sequence, got {other:?}"),
        };
        assert!(elements.len() >= 2);
        for (i, phase) in elements.iter().enumerate() {
            match (i % 2, phase) {
                (0, StructureNode::Conversation { speakers: s, .. }) => {
                    assert_eq!(s.len(), 4)
                }
                (1, StructureNode::Splitter { elements }) => {
                    assert_eq!(elements.len(), 2);
                    // A pair plus the remaining two speakers
                    let sizes: Vec<usize> = elements
                        .iter()
                        .map(|c| match c {
                            StructureNode::Conversation { speakers, .. } => speakers.len(),
                            other => panic!("expected conversation, got {other:?}"),
                        })
                        .collect();
                    assert_eq!(sizes, [2, 2]);
                }
                (_, other) => panic!("unexpected phase {i}: {other:?}"),
            }
        }
        // Phases cover the session exactly
        assert!((node.duration() - 1800.0).abs() < 1e-6);
    }

    #[test]
    fn test_cafe_structure_validates() {
        let mut rng = StdRng::seed_from_u64(3);
        let node = cafe_structure(&[4, 4, 4], 1800.0, Some(&PhaseControls::default()), &mut rng);
        node.validate().unwrap();
        assert!((node.duration() - 1800.0).abs() < 1e-6);

        match &node {
            StructureNode::Sequence { speakers, elements } => {
                assert_eq!(speakers.len(), 12);
                assert_eq!(elements.len(), 1);
                match &elements[0] {
                    StructureNode::Splitter { elements } => assert_eq!(elements.len(), 3),
                    other => panic!("expected splitter, got {other:?}"),
                }
            }
            other => panic!("expected sequence, got {other:?}"),
        }
    }

    #[test]
    fn test_same_seed_same_structure() {
        let controls = PhaseControls::default();
        let mut rng_a = StdRng::seed_from_u64(21);
        let mut rng_b = StdRng::seed_from_u64(21);
        let a = cafe_structure(&[4, 4], 1800.0, Some(&controls), &mut rng_a);
        let b = cafe_structure(&[4, 4], 1800.0, Some(&controls), &mut rng_b);
        assert_eq!(a, b);
    }
}
