//! Turn-taking policy
//!
//! Which speaker takes the next turn, and how much a turn's start jitters
//! relative to the running conversation cursor, are policy decisions injected
//! into conversation expansion rather than fixed rules. The built-in policies
//! are driven by [`TurnTakingParams`]; callers with different scheduling
//! needs implement [`TurnPolicy`] themselves.
//!
//! All randomness flows through the rng handed in by the generator, so a
//! policy never draws from ambient global state.

use rand::rngs::StdRng;
use rand::Rng;

use mpss_common::params::{SelectionPolicy, TurnTakingParams};
use mpss_common::structure::SpeakerId;

/// Scheduling discipline for one conversation's turns
pub trait TurnPolicy {
    /// Choose the speaker for the next turn
    ///
    /// `speakers` is the conversation's effective speaker set in id order
    /// (never empty); `last` is the previous turn's speaker, None for the
    /// first turn.
    fn next_speaker(
        &mut self,
        speakers: &[SpeakerId],
        last: Option<SpeakerId>,
        rng: &mut StdRng,
    ) -> SpeakerId;

    /// Offset of the next turn's start relative to the running cursor,
    /// in seconds: negative = overlap, positive = gap
    fn jitter(&mut self, rng: &mut StdRng) -> f64;

    /// Minimum turn length the policy schedules, seconds
    fn min_turn(&self) -> f64;
}

/// Build the policy selected by the given parameters
pub fn policy_from_params(params: &TurnTakingParams) -> Box<dyn TurnPolicy> {
    match params.selection {
        SelectionPolicy::RandomNoRepeat => Box::new(RandomNoRepeat::new(*params)),
        SelectionPolicy::RoundRobin => Box::new(RoundRobin::new(*params)),
    }
}

fn draw_jitter(params: &TurnTakingParams, rng: &mut StdRng) -> f64 {
    if params.max_overlap == 0.0 && params.max_gap == 0.0 {
        return 0.0;
    }
    rng.gen_range(-params.max_overlap..=params.max_gap)
}

/// Uniform random speaker choice excluding the previous speaker
#[derive(Debug, Clone)]
pub struct RandomNoRepeat {
    params: TurnTakingParams,
}

impl RandomNoRepeat {
    pub fn new(params: TurnTakingParams) -> Self {
        RandomNoRepeat { params }
    }
}

impl TurnPolicy for RandomNoRepeat {
    fn next_speaker(
        &mut self,
        speakers: &[SpeakerId],
        last: Option<SpeakerId>,
        rng: &mut StdRng,
    ) -> SpeakerId {
        let candidates: Vec<SpeakerId> = speakers
            .iter()
            .copied()
            .filter(|&s| Some(s) != last)
            .collect();
        candidates[rng.gen_range(0..candidates.len())]
    }

    fn jitter(&mut self, rng: &mut StdRng) -> f64 {
        draw_jitter(&self.params, rng)
    }

    fn min_turn(&self) -> f64 {
        self.params.min_turn
    }
}

/// Speakers take turns in id order
#[derive(Debug, Clone)]
pub struct RoundRobin {
    params: TurnTakingParams,
    next: usize,
}

impl RoundRobin {
    pub fn new(params: TurnTakingParams) -> Self {
        RoundRobin { params, next: 0 }
    }
}

impl TurnPolicy for RoundRobin {
    fn next_speaker(
        &mut self,
        speakers: &[SpeakerId],
        _last: Option<SpeakerId>,
        _rng: &mut StdRng,
    ) -> SpeakerId {
        let speaker = speakers[self.next % speakers.len()];
        self.next = (self.next + 1) % speakers.len();
        speaker
    }

    fn jitter(&mut self, rng: &mut StdRng) -> f64 {
        draw_jitter(&self.params, rng)
    }

    fn min_turn(&self) -> f64 {
        self.params.min_turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn speakers(ids: &[u32]) -> Vec<SpeakerId> {
        ids.iter().copied().map(SpeakerId).collect()
    }

    #[test]
    fn test_random_never_repeats_previous() {
        let mut policy = RandomNoRepeat::new(TurnTakingParams::default());
        let mut rng = StdRng::seed_from_u64(7);
        let set = speakers(&[1, 2, 3]);

        let mut last = None;
        for _ in 0..200 {
            let chosen = policy.next_speaker(&set, last, &mut rng);
            assert_ne!(Some(chosen), last);
            last = Some(chosen);
        }
    }

    #[test]
    fn test_random_two_speakers_alternate() {
        let mut policy = RandomNoRepeat::new(TurnTakingParams::default());
        let mut rng = StdRng::seed_from_u64(3);
        let set = speakers(&[5, 9]);

        let first = policy.next_speaker(&set, None, &mut rng);
        let second = policy.next_speaker(&set, Some(first), &mut rng);
        let third = policy.next_speaker(&set, Some(second), &mut rng);
        assert_ne!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn test_round_robin_cycles_in_order() {
        let mut policy = RoundRobin::new(TurnTakingParams::default());
        let mut rng = StdRng::seed_from_u64(0);
        let set = speakers(&[2, 4, 6]);

        let order: Vec<u32> = (0..6)
            .map(|_| policy.next_speaker(&set, None, &mut rng).0)
            .collect();
        assert_eq!(order, [2, 4, 6, 2, 4, 6]);
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let params = TurnTakingParams {
            max_overlap: 0.25,
            max_gap: 0.5,
            ..TurnTakingParams::default()
        };
        let mut policy = RandomNoRepeat::new(params);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..500 {
            let j = policy.jitter(&mut rng);
            assert!((-0.25..=0.5).contains(&j), "jitter {j} out of bounds");
        }
    }

    #[test]
    fn test_zero_bounds_give_zero_jitter() {
        let params = TurnTakingParams {
            max_overlap: 0.0,
            max_gap: 0.0,
            ..TurnTakingParams::default()
        };
        let mut policy = RandomNoRepeat::new(params);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(policy.jitter(&mut rng), 0.0);
    }
}
