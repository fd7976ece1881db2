use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

use neurite_nn::config::{LossKind, OptimizerKind};

/// Settings for the synthetic training demo. Every field except `version`
/// can come from a JSON config file and be overridden by a CLI flag.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrainConfig {
    pub version: String,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    /// Hidden layer widths between the single input and single output.
    pub hidden: Vec<usize>,
    pub loss: LossKind,
    pub optimizer: OptimizerKind,
    pub samples: usize,
    /// Standard deviation of the gaussian noise added to the targets.
    pub noise: f32,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            version: clap::crate_version!().to_string(),
            epochs: 100,
            batch_size: 10,
            learning_rate: 0.01,
            hidden: vec![10],
            loss: LossKind::Mse,
            optimizer: OptimizerKind::Sgd,
            samples: 100,
            noise: 1.0,
            seed: 42,
        }
    }
}

/// Read a config file, filling in defaults for missing or invalid fields.
pub fn load_train_config(config_path: &PathBuf) -> Result<TrainConfig> {
    let config_json = fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

    let partial: serde_json::Value = serde_json::from_str(&config_json)?;
    let mut config = TrainConfig::default();

    macro_rules! load_or_default {
        ($field:ident) => {
            if let Some(val) = partial.get(stringify!($field)) {
                if let Ok(parsed) = serde_json::from_value(val.clone()) {
                    config.$field = parsed;
                } else {
                    log::warn!(
                        "Config Invalid value for '{}', using default: {:?}",
                        stringify!($field),
                        config.$field
                    );
                }
            } else {
                log::warn!(
                    "Config Missing field '{}', using default: {:?}",
                    stringify!($field),
                    config.$field
                );
            }
        };
    }

    load_or_default!(epochs);
    load_or_default!(batch_size);
    load_or_default!(learning_rate);
    load_or_default!(hidden);
    load_or_default!(loss);
    load_or_default!(optimizer);
    load_or_default!(samples);
    load_or_default!(noise);
    load_or_default!(seed);

    Ok(config)
}

impl TrainConfig {
    /// Config file plus CLI overrides, the precedence the `train`
    /// subcommand documents.
    pub fn from_arguments(config_path: &PathBuf, matches: &ArgMatches) -> Result<Self> {
        let mut config = load_train_config(config_path)?;
        config.apply_overrides(matches)?;
        Ok(config)
    }

    /// Apply explicitly passed CLI flags on top of the current values.
    pub fn apply_overrides(&mut self, matches: &ArgMatches) -> Result<()> {
        if let Some(epochs) = matches.get_one::<usize>("epochs") {
            self.epochs = *epochs;
        }
        if let Some(batch_size) = matches.get_one::<usize>("batch_size") {
            self.batch_size = *batch_size;
        }
        if let Some(learning_rate) = matches.get_one::<f32>("learning_rate") {
            self.learning_rate = *learning_rate;
        }
        if let Some(hidden) = matches.get_many::<usize>("hidden") {
            self.hidden = hidden.copied().collect();
        }
        if let Some(loss) = matches.get_one::<String>("loss") {
            self.loss = LossKind::from_str(loss).map_err(anyhow::Error::msg)?;
        }
        if let Some(optimizer) = matches.get_one::<String>("optimizer") {
            self.optimizer = OptimizerKind::from_str(optimizer).map_err(anyhow::Error::msg)?;
        }
        if let Some(samples) = matches.get_one::<usize>("samples") {
            self.samples = *samples;
        }
        if let Some(noise) = matches.get_one::<f32>("noise") {
            self.noise = *noise;
        }
        if let Some(seed) = matches.get_one::<u64>("seed") {
            self.seed = *seed;
        }
        Ok(())
    }
}
