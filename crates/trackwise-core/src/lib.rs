//! Cross-cutting plumbing for TrackWise binaries: configuration loading,
//! the JSON error envelope, health probes, request ids, and tracing setup.

pub mod clock;
pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
