//! # MPSS Scene Renderer Library (mpss-sr)
//!
//! Materializes a scene segment list into a multichannel sample buffer.
//!
//! **Purpose:** allocate the channels × samples buffer, resolve each
//! segment's time span to a sample range, pull samples from source clips or
//! the noise synthesizer, and write them sample-accurately into place.

pub mod buffer;
pub mod error;
pub mod noise;
pub mod render;
pub mod source;

pub use buffer::SampleBuffer;
pub use error::{RenderError, Result};
pub use render::render;
pub use source::{ClipReader, MemoryClipReader, WavClipReader};
