//! Storyfeed — Feed bounded context.
//!
//! Responsible for merging followed and own stories into seller groups,
//! dropping expired stories from the working set, and presenting the groups
//! as the story bar.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
