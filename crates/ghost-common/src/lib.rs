//! # Ghostline Common
//!
//! Common types and shared abstractions for Ghostline.
//!
//! This crate provides foundational types used by the recorder, the replay
//! scheduler and the game simulations:
//! - Error types for log import and session control
//! - Per-session entity ids
//! - The seeded random source that drives world generation
//! - Version information for the exported log format
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod rng;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::rng::*;
    pub use crate::version::*;
}

pub use prelude::*;
