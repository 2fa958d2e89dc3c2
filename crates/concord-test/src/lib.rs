//! Concord Test Harness - Probes, jitter and end-to-end scenarios
//!
//! This crate provides:
//! - `Probe`: a recording subscriber
//! - `JitterRelay`: a forwarding stage with random per-snapshot delay
//! - `jittered`: a combiner source wrapper that puts a jitter relay on
//!   every subscription, to provoke cross-edge reordering
//! - End-to-end authority scenarios

pub mod probe;
pub mod jitter;
#[cfg(test)]
mod scenarios;

pub use probe::*;
pub use jitter::*;
