//! Storyfeed Core — shared domain abstractions.
//!
//! This crate defines the story model and the traits that every story
//! context depends on: time, timers, commands, errors and the external
//! collaborators (storage, media upload, platform sharing). It contains no
//! infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod media;
pub mod platform;
pub mod repository;
pub mod scheduler;
pub mod story;
pub mod time_window;
