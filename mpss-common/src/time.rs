//! Time / sample-index conversion
//!
//! Scene times are f64 seconds measured from the scene's global origin.
//! Every conversion to a sample index goes through [`time_to_samples`], which
//! rounds half-up. Two adjacent segments that share a boundary time therefore
//! resolve to the same sample index: no one-sample gap, no one-sample overlap.
//!
//! # Examples
//!
//! ```rust
//! use mpss_common::time::{time_to_samples, samples_to_time};
//!
//! assert_eq!(time_to_samples(1.0, 16000), 16_000);
//! assert_eq!(time_to_samples(0.5, 44100), 22_050);
//!
//! // Round half-up at the midpoint
//! assert_eq!(time_to_samples(1.5, 1), 2);
//!
//! let t = samples_to_time(22_050, 44100);
//! assert!((t - 0.5).abs() < 1e-12);
//! ```

/// Convert a time in seconds to a sample index at the given rate
///
/// Rounds half-up: `floor(t * rate + 0.5)`. Negative times clamp to 0.
///
/// # Panics
///
/// Panics if `sample_rate` is 0.
pub fn time_to_samples(seconds: f64, sample_rate: u32) -> usize {
    assert!(sample_rate > 0, "sample_rate must be > 0");

    let exact = seconds * sample_rate as f64;
    if exact <= 0.0 {
        return 0;
    }
    (exact + 0.5).floor() as usize
}

/// Convert a sample index at the given rate to a time in seconds
///
/// # Panics
///
/// Panics if `sample_rate` is 0.
pub fn samples_to_time(samples: usize, sample_rate: u32) -> f64 {
    assert!(sample_rate > 0, "sample_rate must be > 0");

    samples as f64 / sample_rate as f64
}

/// Convert a half-open time span `[start, end)` to a half-open sample range
///
/// Both endpoints use the same half-up rounding, so spans that abut in time
/// abut in samples. A span that collapses to zero samples after rounding
/// yields an empty range (`start == end`).
pub fn span_to_samples(start: f64, end: f64, sample_rate: u32) -> (usize, usize) {
    let a = time_to_samples(start, sample_rate);
    let b = time_to_samples(end, sample_rate);
    (a, b.max(a))
}
