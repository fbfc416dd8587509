//! Storyfeed — Composer bounded context.
//!
//! Responsible for the story creation wizard, media validation and
//! compression, uploading, and the publish and delete commands.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
