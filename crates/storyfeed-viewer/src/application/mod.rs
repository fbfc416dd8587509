//! Timer-driven viewer.

mod engagement;
pub mod timer;
pub mod viewer;
