//! Indicator drivers.

pub mod indicator;
