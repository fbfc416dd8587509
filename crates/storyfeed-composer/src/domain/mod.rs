//! Draft rules, media handling and commands.

pub mod commands;
pub mod draft;
pub mod media;
