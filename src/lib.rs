//! # pixelbayes
//!
//! Naive Bayes classification of fixed-size ASCII pixel grids (e.g. handwritten digits).
//!
//! - [`pixelbayes_core`] - pixels, images, errors, Laplace smoothing
//! - [`pixelbayes_models`] - feature table, corpus loader, classifier
//! - [`config`] - engine configuration via TOML
//! - [`logging`] - `tracing` subscriber setup

pub mod config;
pub mod logging;

// Re-export public API
pub use config::{ConfigError, EngineConfig};
pub use pixelbayes_core::*;
pub use pixelbayes_models::*;
