//! # sasa-core — training run bootstrap
//!
//! Startup for stand-alone self-attention ResNet training runs. One call to
//! [`bootstrap`] turns defaults, an optional TOML file, and command-line
//! overrides into a resolved [`RunConfig`], opens the run [`Logger`], logs the
//! configuration, and returns seeded random streams in a [`SeedManager`].
//!
//! Nothing here is global: the caller owns the logger and the generators and
//! passes them to the model, data, and training components.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod reproducibility;

// Re-exports
pub use bootstrap::{BootstrapOptions, RunContext, bootstrap, bootstrap_with, seed_bits};
pub use config::{ConfigOverrides, RunConfig, load_config};
pub use error::BootstrapError;
pub use logging::{Logger, LoggerBuilder};
pub use reproducibility::{BackendFlags, RngStream, SeedManager};
