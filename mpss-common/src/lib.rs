//! # MPSS Common Library
//!
//! Shared code for the MPSS tools including:
//! - Structure model (the scenario tree)
//! - Scene segment model (flat, timed audio events)
//! - Time / sample-index conversion
//! - Generation and rendering parameters
//! - Common error type

pub mod error;
pub mod params;
pub mod scene;
pub mod structure;
pub mod time;

pub use error::{Error, Result};
pub use scene::{ChannelId, GeneratorSpec, Payload, SceneSegment};
pub use structure::{NoiseColor, NoiseParams, SpeakerId, StructureNode};
