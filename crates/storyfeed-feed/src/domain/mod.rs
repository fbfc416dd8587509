//! Pure feed rules: grouping, sweeping and bar ordering.

pub mod aggregation;
pub mod bar;
pub mod sweep;
