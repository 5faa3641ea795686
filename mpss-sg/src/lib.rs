//! # MPSS Scene Generator Library (mpss-sg)
//!
//! Interprets a scenario structure tree into a flat, time-stamped scene
//! segment list ready for rendering.
//!
//! **Purpose:** walk the structure recursively, thread per-timeline cursors,
//! expand conversations into per-speaker turns under a configurable
//! turn-taking policy, and emit one ordered segment list.
//!
//! Also hosts the randomized structure builder behind the `mpss-st` binary.

pub mod builder;
pub mod clips;
pub mod error;
pub mod generator;
pub mod policy;

pub use clips::{Clip, ClipPool, ClipSource};
pub use error::{GenerateError, Result};
pub use generator::SceneGenerator;
