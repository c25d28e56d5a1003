//! Run bootstrap: resolve the configuration, open the logger, fix the seeds.

use chrono::Local;
use std::path::{Path, PathBuf};

use crate::config::{ConfigOverrides, RunConfig, load_config};
use crate::error::Result;
use crate::logging::{DEFAULT_LOG_ROOT, Logger, LoggerBuilder};
use crate::reproducibility::SeedManager;

/// Everything a training run needs from startup.
#[derive(Debug)]
pub struct RunContext {
    pub config: RunConfig,
    pub logger: Logger,
    pub seeds: SeedManager,
}

impl RunContext {
    pub fn into_parts(self) -> (RunConfig, Logger, SeedManager) {
        (self.config, self.logger, self.seeds)
    }
}

/// Options for [`bootstrap_with`]. The defaults match a normal run.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Optional TOML file layered between defaults and flags.
    pub config_file: Option<PathBuf>,
    /// Directory holding the `<filename>.log` file.
    pub log_root: PathBuf,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            config_file: None,
            log_root: PathBuf::from(DEFAULT_LOG_ROOT),
        }
    }
}

/// Bootstrap a run with the console logging to stderr.
pub fn bootstrap(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<RunContext> {
    let options = BootstrapOptions {
        config_file: config_file.map(Path::to_path_buf),
        ..Default::default()
    };
    bootstrap_with(&options, overrides, |filename, config| {
        Logger::builder(filename, config)
    })
}

/// Bootstrap a run.
///
/// `make_logger` receives the log filename and the resolved configuration and
/// returns the builder to finish; the log root from `options` is applied on
/// top of it.
pub fn bootstrap_with<F>(
    options: &BootstrapOptions,
    overrides: &ConfigOverrides,
    make_logger: F,
) -> Result<RunContext>
where
    F: FnOnce(String, &RunConfig) -> LoggerBuilder,
{
    let config = load_config(options.config_file.as_deref(), overrides)?.resolve(Local::now());

    let filename = config.log_filename();
    let logger = make_logger(filename, &config)
        .log_root(&options.log_root)
        .build()?;

    let summary = serde_json::to_string(&config)?;
    let seeds = logger.in_scope(|| {
        tracing::info!("{summary}");
        SeedManager::fix(seed_bits(config.seed))
    });

    Ok(RunContext {
        config,
        logger,
        seeds,
    })
}

/// Generator seed for a configured seed. Negative seeds keep their two's
/// complement bits, so every `i64` maps to a distinct `u64`.
pub fn seed_bits(seed: i64) -> u64 {
    seed as u64
}
