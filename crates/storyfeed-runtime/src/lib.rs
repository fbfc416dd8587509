//! Storyfeed — runtime wiring.
//!
//! Loads configuration, installs tracing, provides the tokio-backed
//! scheduler, and assembles the feed, bar, viewer and composer into one
//! session per signed-in user.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod session;
pub mod telemetry;
