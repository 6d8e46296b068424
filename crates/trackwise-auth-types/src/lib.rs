//! Session types shared by the TrackWise service and its test helpers.
//!
//! Provides JWT session tokens, the session cookie builders, and the
//! `Principal` extractor handed to every authenticated handler.

pub mod cookie;
pub mod principal;
pub mod token;
