//! Seeded noise synthesis
//!
//! Fills generator segments with white or pink noise at a target RMS level.
//! Every segment carries its own seed (assigned at generation time), so the
//! same scene renders to the same samples on every run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mpss_common::scene::GeneratorSpec;
use mpss_common::structure::NoiseColor;

/// Rows in the Voss-McCartney pink noise generator
const PINK_ROWS: usize = 16;

/// Synthesize `count` samples for a generator segment
pub fn synthesize(spec: &GeneratorSpec, count: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let raw = match spec.noise.color {
        NoiseColor::White => white(&mut rng, count),
        NoiseColor::Pink => pink(&mut rng, count),
    };
    scale_to_rms(raw, spec.noise.rms)
}

fn white(rng: &mut StdRng, count: usize) -> Vec<f64> {
    (0..count).map(|_| rng.gen_range(-1.0..=1.0)).collect()
}

/// Voss-McCartney: one row per octave, row `trailing_zeros(n)` refreshed at
/// step n, plus a per-sample white component
fn pink(rng: &mut StdRng, count: usize) -> Vec<f64> {
    let mut rows = [0.0f64; PINK_ROWS];
    for row in rows.iter_mut() {
        *row = rng.gen_range(-1.0..=1.0);
    }

    let mut out = Vec::with_capacity(count);
    for n in 0..count as u64 {
        let row = (n + 1).trailing_zeros() as usize;
        if row < PINK_ROWS {
            rows[row] = rng.gen_range(-1.0..=1.0);
        }
        let white: f64 = rng.gen_range(-1.0..=1.0);
        out.push(rows.iter().sum::<f64>() + white);
    }
    out
}

/// Scale a signal to an exact target RMS level
fn scale_to_rms(raw: Vec<f64>, rms: f64) -> Vec<f32> {
    if raw.is_empty() || rms == 0.0 {
        return vec![0.0; raw.len()];
    }
    let actual = (raw.iter().map(|s| s * s).sum::<f64>() / raw.len() as f64).sqrt();
    if actual == 0.0 {
        return vec![0.0; raw.len()];
    }
    let gain = rms / actual;
    raw.into_iter().map(|s| (s * gain) as f32).collect()
}
