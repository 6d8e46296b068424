//! Test utilities for TrackWise crates.
//!
//! Provides session cookie minting, a manually driven clock, and principal
//! builders. Import in `#[cfg(test)]` blocks and integration tests only.

pub mod clock;
pub mod session;
