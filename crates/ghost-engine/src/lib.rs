//! # Ghostline Engine
//!
//! Headless driver for Ghostline sessions.
//!
//! This crate ties the core crates together:
//! - Config: TOML harness settings and game tuning
//! - Harness: record, export to disk, re-import, replay and compare
//! - Timing: wall-clock tick pacing for realtime runs

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod harness;
pub mod timing;

pub use config::{GameChoice, HarnessConfig, InputChoice};
pub use harness::{run, HarnessError, HarnessReport};
