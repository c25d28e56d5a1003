//! Training flags.
//!
//! Every flag is optional. An absent flag leaves the value from the config
//! file (or the built-in default) in place; the defaults listed here are the
//! built-in ones. Numeric values are not range-checked; negative numbers
//! are accepted and passed on as given.

use clap::Args;
use sasa_core::ConfigOverrides;
use std::path::PathBuf;

#[derive(Args, Debug, Default, Clone, PartialEq)]
pub struct TrainArgs {
    /// Dataset: CIFAR10, CIFAR100, MNIST, IMAGENET [default: CIFAR10]
    #[arg(long)]
    pub dataset: Option<String>,

    /// Model: ResNet26, ResNet38, ResNet50 [default: ResNet26]
    #[arg(long)]
    pub model_name: Option<String>,

    /// Input image size [default: 32]
    #[arg(long, allow_negative_numbers = true)]
    pub img_size: Option<i64>,

    /// Samples per training batch [default: 25]
    #[arg(long, allow_negative_numbers = true)]
    pub batch_size: Option<i64>,

    /// Data loader worker count [default: 0]
    #[arg(long, allow_negative_numbers = true)]
    pub num_workers: Option<i64>,

    /// Number of passes over the training set [default: 100]
    #[arg(long, allow_negative_numbers = true)]
    pub epochs: Option<i64>,

    /// Learning rate [default: 0.1]
    #[arg(long, allow_negative_numbers = true)]
    pub lr: Option<f64>,

    /// SGD momentum factor [default: 0.9]
    #[arg(long, allow_negative_numbers = true)]
    pub momentum: Option<f64>,

    /// L2 penalty applied by the optimizer [default: 0.0001]
    #[arg(long, allow_negative_numbers = true)]
    pub weight_decay: Option<f64>,

    /// Steps between progress records [default: 100]
    #[arg(long, allow_negative_numbers = true)]
    pub print_interval: Option<i64>,

    /// Train on GPU [default: true]
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub cuda: Option<bool>,

    /// Start from pretrained weights [default: false]
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub pretrained_model: Option<bool>,

    /// Attention stem (true) or convolution stem (false) [default: false]
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub stem: Option<bool>,

    /// Random seed [default: 123456789]
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i64>,

    /// Enable distributed training [default: false]
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub distributed: Option<bool>,

    /// GPU ids to train on
    #[arg(long, value_name = "ID", num_args = 1.., allow_negative_numbers = true)]
    pub gpu_devices: Option<Vec<i64>>,

    /// GPU id for this process
    #[arg(long, allow_negative_numbers = true)]
    pub gpu: Option<i64>,

    /// Current process number [default: 0]
    #[arg(long, allow_negative_numbers = true)]
    pub rank: Option<i64>,

    /// Total number of processes, usually the number of GPUs [default: 1]
    #[arg(long, allow_negative_numbers = true)]
    pub world_size: Option<i64>,

    /// Collective communication backend for distributed runs [default: nccl]
    #[arg(long)]
    pub dist_backend: Option<String>,

    /// Rendezvous address of the distributed process group [default: tcp://127.0.0.1:3456]
    #[arg(long)]
    pub dist_url: Option<String>,

    /// Base log directory; the run timestamp is appended [default: log]
    #[arg(long, alias = "log_dir")]
    pub log_dir: Option<PathBuf>,

    /// Base checkpoint directory; the run timestamp is appended [default: checkpoint]
    #[arg(long, alias = "checkpoint_dir")]
    pub checkpoint_dir: Option<PathBuf>,

    /// Run timestamp. Generated when omitted; pass the original one to resume
    #[arg(long)]
    pub timestamp: Option<String>,
}

/// The flag layer of the run configuration.
impl From<TrainArgs> for ConfigOverrides {
    fn from(a: TrainArgs) -> Self {
        ConfigOverrides {
            dataset: a.dataset,
            model_name: a.model_name,
            img_size: a.img_size,
            batch_size: a.batch_size,
            num_workers: a.num_workers,
            epochs: a.epochs,
            lr: a.lr,
            momentum: a.momentum,
            weight_decay: a.weight_decay,
            print_interval: a.print_interval,
            cuda: a.cuda,
            pretrained_model: a.pretrained_model,
            stem: a.stem,
            seed: a.seed,
            distributed: a.distributed,
            gpu_devices: a.gpu_devices,
            gpu: a.gpu,
            rank: a.rank,
            world_size: a.world_size,
            dist_backend: a.dist_backend,
            dist_url: a.dist_url,
            log_dir: a.log_dir,
            checkpoint_dir: a.checkpoint_dir,
            timestamp: a.timestamp,
        }
    }
}
