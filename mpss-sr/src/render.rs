//! Scene rendering
//!
//! Materializes a scene segment list into a fixed-size multichannel sample
//! buffer. Each segment resolves to a half-open sample range via the shared
//! half-up rounding and its samples are written — overwritten, not mixed —
//! into its channel. Segments never read one another's output, so processing
//! order cannot change the result.
//!
//! Rendering is all-or-nothing: any segment that resolves outside the buffer
//! or cannot supply its samples aborts the run.

use tracing::{debug, info};

use mpss_common::params::RenderParams;
use mpss_common::scene::{implied_channel_count, Payload, SceneSegment};
use mpss_common::time::{span_to_samples, time_to_samples};

use crate::buffer::SampleBuffer;
use crate::error::{RenderError, Result};
use crate::noise;
use crate::source::ClipReader;

/// Render a scene segment list into a sample buffer
///
/// The buffer spans `max(end)` over all segments at `params.sample_rate`;
/// its channel count is `params.channel_count`, or the highest targeted
/// channel + 1 when unset.
pub fn render(
    segments: &[SceneSegment],
    params: &RenderParams,
    clips: &impl ClipReader,
) -> Result<SampleBuffer> {
    let sample_rate = params.sample_rate;
    let channel_count = params
        .channel_count
        .unwrap_or_else(|| implied_channel_count(segments));
    let total_samples = segments
        .iter()
        .map(|s| time_to_samples(s.end, sample_rate))
        .max()
        .unwrap_or(0);

    info!(
        channels = channel_count,
        samples = total_samples,
        "rendering scene"
    );
    let mut buffer = SampleBuffer::new(channel_count, total_samples);

    for (index, segment) in segments.iter().enumerate() {
        if !segment.start.is_finite()
            || !segment.end.is_finite()
            || segment.start < 0.0
            || segment.end <= segment.start
        {
            return Err(RenderError::Target {
                index,
                message: format!("invalid span [{}, {})", segment.start, segment.end),
            });
        }
        if segment.channel.0 >= channel_count {
            return Err(RenderError::Target {
                index,
                message: format!(
                    "channel {} outside the {channel_count}-channel buffer",
                    segment.channel
                ),
            });
        }

        let (start, end) = span_to_samples(segment.start, segment.end, sample_rate);
        if end > total_samples {
            return Err(RenderError::Target {
                index,
                message: format!("sample range {start}..{end} exceeds buffer {total_samples}"),
            });
        }
        if start == end {
            // Collapsed to zero samples by rounding
            debug!(index, "segment shorter than half a sample, skipped");
            continue;
        }

        let count = end - start;
        let samples = match &segment.payload {
            Payload::File { path, clip_offset } => {
                let offset = time_to_samples(*clip_offset, sample_rate);
                clips
                    .read_span(path, offset, count)
                    .map_err(|e| RenderError::Source { index, source: e })?
            }
            Payload::Generator { generator_params } => {
                noise::synthesize(generator_params, count)
            }
        };

        buffer.channel_mut(segment.channel.0)[start..end].copy_from_slice(&samples);
    }

    Ok(buffer)
}
