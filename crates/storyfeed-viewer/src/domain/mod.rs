//! Pure playback rules and slide rendering.

pub mod playback;
pub mod slides;
