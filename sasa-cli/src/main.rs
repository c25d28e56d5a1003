//! sasa-train — bootstraps a stand-alone self-attention ResNet training run.
//!
//! Parses the training flags, resolves the run configuration, opens the run
//! log, and fixes the random seeds.

mod args;

use args::TrainArgs;
use clap::Parser;
use sasa_core::{ConfigOverrides, RunContext};
use std::path::PathBuf;

/// Train ResNets with stand-alone self-attention
#[derive(Parser, Debug)]
#[command(name = "sasa-train", version, about, long_about = None)]
struct Cli {
    /// TOML file with configuration values (flags take precedence)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(flatten)]
    train: TrainArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides::from(cli.train);
    let RunContext {
        config,
        logger,
        seeds,
    } = sasa_core::bootstrap(cli.config.as_deref(), &overrides)?;
    logger.install()?;

    tracing::info!(
        timestamp = %config.timestamp,
        checkpoint_dir = %config.checkpoint_dir.display(),
        log_file = %logger.file_path().display(),
        seed = seeds.seed(),
        "run bootstrapped"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("sasa-train").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_flags_means_no_overrides() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.config, None);
        assert_eq!(ConfigOverrides::from(cli.train), ConfigOverrides::default());
    }

    #[test]
    fn test_no_flags_resolve_to_defaults() {
        let cli = parse(&[]).unwrap();
        let config =
            sasa_core::load_config(None, &ConfigOverrides::from(cli.train)).unwrap();
        assert_eq!(config, sasa_core::RunConfig::default());
    }

    #[test]
    fn test_all_flags() {
        let cli = parse(&[
            "--dataset", "CIFAR100",
            "--model-name", "ResNet50",
            "--img-size", "224",
            "--batch-size", "64",
            "--num-workers", "4",
            "--epochs", "90",
            "--lr", "0.05",
            "--momentum", "0.8",
            "--weight-decay", "5e-4",
            "--print-interval", "10",
            "--cuda", "false",
            "--pretrained-model",
            "--stem",
            "--seed", "1",
            "--distributed", "true",
            "--gpu-devices", "0", "1", "2",
            "--gpu", "1",
            "--rank", "2",
            "--world-size", "3",
            "--dist-backend", "gloo",
            "--dist-url", "tcp://10.0.0.1:23456",
            "--log-dir", "runs/log",
            "--checkpoint-dir", "runs/ckpt",
            "--timestamp", "Mar01_10-00-00",
        ])
        .unwrap();

        let o = ConfigOverrides::from(cli.train);
        assert_eq!(o.dataset.as_deref(), Some("CIFAR100"));
        assert_eq!(o.model_name.as_deref(), Some("ResNet50"));
        assert_eq!(o.img_size, Some(224));
        assert_eq!(o.batch_size, Some(64));
        assert_eq!(o.num_workers, Some(4));
        assert_eq!(o.epochs, Some(90));
        assert_eq!(o.lr, Some(0.05));
        assert_eq!(o.momentum, Some(0.8));
        assert_eq!(o.weight_decay, Some(5e-4));
        assert_eq!(o.print_interval, Some(10));
        assert_eq!(o.cuda, Some(false));
        assert_eq!(o.pretrained_model, Some(true));
        assert_eq!(o.stem, Some(true));
        assert_eq!(o.seed, Some(1));
        assert_eq!(o.distributed, Some(true));
        assert_eq!(o.gpu_devices, Some(vec![0, 1, 2]));
        assert_eq!(o.gpu, Some(1));
        assert_eq!(o.rank, Some(2));
        assert_eq!(o.world_size, Some(3));
        assert_eq!(o.dist_backend.as_deref(), Some("gloo"));
        assert_eq!(o.dist_url.as_deref(), Some("tcp://10.0.0.1:23456"));
        assert_eq!(o.log_dir, Some(PathBuf::from("runs/log")));
        assert_eq!(o.checkpoint_dir, Some(PathBuf::from("runs/ckpt")));
        assert_eq!(o.timestamp.as_deref(), Some("Mar01_10-00-00"));
    }

    #[test]
    fn test_underscore_dir_aliases() {
        let cli = parse(&["--log_dir", "a", "--checkpoint_dir", "b"]).unwrap();
        assert_eq!(cli.train.log_dir, Some(PathBuf::from("a")));
        assert_eq!(cli.train.checkpoint_dir, Some(PathBuf::from("b")));
    }

    #[test]
    fn test_stem_flag_names_log_file() {
        let cli = parse(&["--dataset", "CIFAR100", "--model-name", "ResNet50", "--stem"]).unwrap();
        let config =
            sasa_core::load_config(None, &ConfigOverrides::from(cli.train)).unwrap();
        assert_eq!(config.log_filename(), "CIFAR100_ResNet50_True");
    }

    #[test]
    fn test_bool_flag_rejects_non_bool() {
        let err = parse(&["--cuda", "yes"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let err = parse(&["--batch-size", "ten"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(parse(&["--lr", "fast"]).is_err());
        assert!(parse(&["--seed", "1.5"]).is_err());
    }

    #[test]
    fn test_negative_numbers_are_values() {
        let cli = parse(&[
            "--batch-size", "-5",
            "--world-size", "-1",
            "--gpu", "-1",
            "--seed", "-3",
            "--lr", "-0.1",
            "--momentum", "-0.5",
            "--gpu-devices", "-1", "0",
        ])
        .unwrap();

        let o = ConfigOverrides::from(cli.train);
        assert_eq!(o.batch_size, Some(-5));
        assert_eq!(o.world_size, Some(-1));
        assert_eq!(o.gpu, Some(-1));
        assert_eq!(o.seed, Some(-3));
        assert_eq!(o.lr, Some(-0.1));
        assert_eq!(o.momentum, Some(-0.5));
        assert_eq!(o.gpu_devices, Some(vec![-1, 0]));
    }

    #[test]
    fn test_no_cross_field_validation() {
        let cli = parse(&["--rank", "5", "--world-size", "2"]).unwrap();
        let config = sasa_core::load_config(None, &ConfigOverrides::from(cli.train)).unwrap();
        assert_eq!(config.rank, 5);
        assert_eq!(config.world_size, 2);

        let cli = parse(&["--world-size", "0", "--batch-size", "-1"]).unwrap();
        let config = sasa_core::load_config(None, &ConfigOverrides::from(cli.train)).unwrap();
        assert_eq!(config.world_size, 0);
        assert_eq!(config.batch_size, -1);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = parse(&["--not-a-flag", "1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_config_flag() {
        let cli = parse(&["--config", "run.toml", "--epochs", "3"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("run.toml")));
        assert_eq!(cli.train.epochs, Some(3));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
