//! Run configuration for sasa training.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> CLI flags.
//! The resolved [`RunConfig`] is the single record handed to the model, data,
//! training, and checkpoint components.

use chrono::{DateTime, Local};
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BootstrapError, Result};

/// `strftime` pattern for generated run timestamps, e.g. `Jan05_14-30-02`.
pub const TIMESTAMP_FORMAT: &str = "%b%d_%H-%M-%S";

/// Flat configuration record for one training run.
///
/// Values are not cross-checked: a negative batch size or a rank outside the
/// world size is carried through as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// CIFAR10, CIFAR100, MNIST, IMAGENET.
    #[serde(default = "default_dataset")]
    pub dataset: String,
    /// ResNet26, ResNet38, ResNet50.
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_img_size")]
    pub img_size: i64,
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
    #[serde(default)]
    pub num_workers: i64,
    #[serde(default = "default_epochs")]
    pub epochs: i64,
    #[serde(default = "default_lr")]
    pub lr: f64,
    #[serde(default = "default_momentum")]
    pub momentum: f64,
    #[serde(default = "default_weight_decay")]
    pub weight_decay: f64,
    #[serde(default = "default_print_interval")]
    pub print_interval: i64,
    #[serde(default = "default_true")]
    pub cuda: bool,
    #[serde(default)]
    pub pretrained_model: bool,
    /// Attention stem when true, convolution stem when false.
    #[serde(default)]
    pub stem: bool,
    #[serde(default = "default_seed")]
    pub seed: i64,

    #[serde(default)]
    pub distributed: bool,
    #[serde(default)]
    pub gpu_devices: Option<Vec<i64>>,
    #[serde(default)]
    pub gpu: Option<i64>,
    /// Index of this process in the distributed group.
    #[serde(default)]
    pub rank: i64,
    /// Total number of processes (usually the number of GPUs).
    #[serde(default = "default_world_size")]
    pub world_size: i64,
    #[serde(default = "default_dist_backend")]
    pub dist_backend: String,
    #[serde(default = "default_dist_url")]
    pub dist_url: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,
    /// Generated when empty. Set it explicitly to resume an earlier run.
    #[serde(default)]
    pub timestamp: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            model_name: default_model_name(),
            img_size: default_img_size(),
            batch_size: default_batch_size(),
            num_workers: 0,
            epochs: default_epochs(),
            lr: default_lr(),
            momentum: default_momentum(),
            weight_decay: default_weight_decay(),
            print_interval: default_print_interval(),
            cuda: true,
            pretrained_model: false,
            stem: false,
            seed: default_seed(),
            distributed: false,
            gpu_devices: None,
            gpu: None,
            rank: 0,
            world_size: default_world_size(),
            dist_backend: default_dist_backend(),
            dist_url: default_dist_url(),
            log_dir: default_log_dir(),
            checkpoint_dir: default_checkpoint_dir(),
            timestamp: String::new(),
        }
    }
}

impl RunConfig {
    /// Fill in the timestamp (from `now` when empty) and nest the checkpoint
    /// and log directories under it.
    pub fn resolve(mut self, now: DateTime<Local>) -> Self {
        if self.timestamp.is_empty() {
            self.timestamp = now.format(TIMESTAMP_FORMAT).to_string();
        }
        self.checkpoint_dir = self.checkpoint_dir.join(&self.timestamp);
        self.log_dir = self.log_dir.join(&self.timestamp);
        self
    }

    /// Base name of the run's log file: `<dataset>_<model_name>_<stem>`.
    ///
    /// The stem flag renders as `True`/`False` so names line up with logs
    /// written by earlier tooling.
    pub fn log_filename(&self) -> String {
        let stem = if self.stem { "True" } else { "False" };
        format!("{}_{}_{}", self.dataset, self.model_name, stem)
    }
}

fn default_dataset() -> String {
    "CIFAR10".to_string()
}

fn default_model_name() -> String {
    "ResNet26".to_string()
}

fn default_img_size() -> i64 {
    32
}

fn default_batch_size() -> i64 {
    25
}

fn default_epochs() -> i64 {
    100
}

fn default_lr() -> f64 {
    0.1
}

fn default_momentum() -> f64 {
    0.9
}

fn default_weight_decay() -> f64 {
    1e-4
}

fn default_print_interval() -> i64 {
    100
}

fn default_true() -> bool {
    true
}

fn default_seed() -> i64 {
    123_456_789
}

fn default_world_size() -> i64 {
    1
}

fn default_dist_backend() -> String {
    "nccl".to_string()
}

fn default_dist_url() -> String {
    "tcp://127.0.0.1:3456".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("log")
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("checkpoint")
}

/// Values given explicitly on the command line. Unset fields leave the lower
/// layers untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_workers: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epochs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub momentum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_decay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuda: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretrained_model: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stem: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_devices: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dist_backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dist_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Load the unresolved run configuration.
///
/// Layers, lowest precedence first: built-in defaults, the TOML file at
/// `config_file` (if given; it must exist), then `overrides`.
pub fn load_config(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<RunConfig> {
    let mut figment = Figment::from(Serialized::defaults(RunConfig::default()));

    if let Some(path) = config_file {
        if !path.is_file() {
            return Err(BootstrapError::ConfigNotFound(path.to_path_buf()));
        }
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Serialized::defaults(overrides));

    Ok(figment.extract()?)
}
