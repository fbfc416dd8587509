//! Feed services driven by the session.

pub mod bar_presenter;
pub mod feed_service;
pub mod sweeper;
