//! Command handlers and the wizard service.

pub mod command_handlers;
pub mod composer;
