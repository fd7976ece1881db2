use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use neurite_cli::config::TrainConfig;
use neurite_cli::train;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("NEURITE_LOG", "error,neurite=info"))
        .init();

    let matches = Command::new("neurite")
        .version(clap::crate_version!())
        .about("Feed-forward network demos on a minimal tensor engine")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train a small demo network on synthetic data")
                .arg(
                    Arg::new("config")
                        .help("Path to a training configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("epochs")
                        .short('e')
                        .long("epochs")
                        .help("Number of passes over the training set")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("batch_size")
                        .short('b')
                        .long("batch_size")
                        .help("Rows per minibatch; 0 trains on the full set at once")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("learning_rate")
                        .short('l')
                        .long("learning_rate")
                        .help("Step size handed to the optimizer")
                        .value_parser(clap::value_parser!(f32)),
                )
                .arg(
                    Arg::new("hidden")
                        .long("hidden")
                        .help("Comma separated hidden layer widths, e.g. 16,8")
                        .value_delimiter(',')
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("loss")
                        .long("loss")
                        .help("Loss function; bce switches to the classification demo")
                        .value_parser(["mse", "bce"]),
                )
                .arg(
                    Arg::new("optimizer")
                        .long("optimizer")
                        .help("Weight update rule")
                        .value_parser(["sgd", "adam"]),
                )
                .arg(
                    Arg::new("samples")
                        .short('n')
                        .long("samples")
                        .help("Number of synthetic samples to generate")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("noise")
                        .long("noise")
                        .help("Standard deviation of the target noise")
                        .value_parser(clap::value_parser!(f32)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for the synthetic data generator")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("show_config")
                        .long("show_config")
                        .help("Print the effective configuration as JSON and exit")
                        .action(ArgAction::SetTrue),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(config_path) => {
            eprintln!("[Neurite::Train] Using config: {:?}", config_path);
            TrainConfig::from_arguments(config_path, matches)?
        }
        None => {
            eprintln!("[Neurite::Train] No config provided; using defaults.");
            let mut config = TrainConfig::default();
            config.apply_overrides(matches)?;
            config
        }
    };

    if matches.get_flag("show_config") {
        println!(
            "{}",
            serde_json::to_string_pretty(&config).unwrap_or_default()
        );
        return Ok(());
    }

    if matches.get_one::<PathBuf>("config").is_none() {
        let effective_json = serde_json::to_string_pretty(&config).unwrap_or_default();
        eprintln!("[Neurite::Train] Effective config:\n{}", effective_json);
    }

    match train::run_train(&config) {
        Ok(summary) => {
            eprintln!(
                "[Neurite::Train] Completed {} epochs: loss {:.6} -> {:.6}",
                summary.epochs, summary.initial_loss, summary.final_loss
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
