//! CLI library components for the sepsis early-warning pipeline.

pub mod config;
pub mod logging;
