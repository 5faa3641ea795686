//! Source clip access
//!
//! The renderer pulls segment samples through the [`ClipReader`] trait:
//! `read_span` returns `count` mono samples starting `offset` samples into
//! the clip. [`WavClipReader`] resolves paths against an audio root and
//! decodes WAV files with hound; the file handle lives only for the duration
//! of the call, so it is released on every exit path.
//!
//! Span rounding at segment boundaries can ask for one sample more than a
//! clip holds (the segment's start and end round independently). A shortfall
//! of at most one sample is therefore zero-padded; anything larger is a
//! [`ClipError::Exhausted`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::ClipError;

/// Reads spans of mono samples from source clips
pub trait ClipReader {
    /// Read `count` samples starting `offset` samples into the clip
    fn read_span(&self, path: &str, offset: usize, count: usize) -> Result<Vec<f32>, ClipError>;
}

/// Pad a ≤ 1-sample shortfall; report anything larger
fn finish_span(
    path: &str,
    mut samples: Vec<f32>,
    requested: usize,
) -> Result<Vec<f32>, ClipError> {
    if samples.len() + 1 < requested {
        return Err(ClipError::Exhausted {
            path: path.to_string(),
            requested,
            available: samples.len(),
        });
    }
    samples.resize(requested, 0.0);
    Ok(samples)
}

/// WAV-backed clip reader
///
/// Paths from segment payloads are resolved against the audio root.
/// Multi-channel source clips are reduced to mono by averaging.
#[derive(Debug, Clone)]
pub struct WavClipReader {
    root: PathBuf,
}

impl WavClipReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        WavClipReader { root: root.into() }
    }
}

impl ClipReader for WavClipReader {
    fn read_span(&self, path: &str, offset: usize, count: usize) -> Result<Vec<f32>, ClipError> {
        let full_path = self.root.join(path);
        let mut reader = hound::WavReader::open(&full_path).map_err(|e| ClipError::Read {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        // Decode the requested frame span to f32, interleaved
        let skip = offset * channels;
        let take = count * channels;
        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .skip(skip)
                .take(take)
                .collect::<Result<_, _>>(),
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .skip(skip)
                    .take(take)
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()
            }
        }
        .map_err(|e| ClipError::Read {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        // Reduce to mono
        let mono: Vec<f32> = if channels == 1 {
            interleaved
        } else {
            interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        finish_span(path, mono, count)
    }
}

/// In-memory clip reader for tests and callers with pre-loaded audio
#[derive(Debug, Clone, Default)]
pub struct MemoryClipReader {
    clips: BTreeMap<String, Vec<f32>>,
}

impl MemoryClipReader {
    pub fn new() -> Self {
        MemoryClipReader::default()
    }

    /// Register a mono clip under a path
    pub fn insert(&mut self, path: impl Into<String>, samples: Vec<f32>) {
        self.clips.insert(path.into(), samples);
    }
}

impl ClipReader for MemoryClipReader {
    fn read_span(&self, path: &str, offset: usize, count: usize) -> Result<Vec<f32>, ClipError> {
        let clip = self.clips.get(path).ok_or_else(|| ClipError::Read {
            path: path.to_string(),
            message: "no such clip".to_string(),
        })?;
        let span: Vec<f32> = clip.iter().skip(offset).take(count).copied().collect();
        finish_span(path, span, count)
    }
}
