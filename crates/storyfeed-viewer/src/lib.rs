//! Storyfeed — Viewer bounded context.
//!
//! Responsible for sequential, auto-advancing playback of stories and their
//! slides, pause and resume, navigation, and best-effort engagement
//! recording.

pub mod application;
pub mod config;
pub mod domain;
