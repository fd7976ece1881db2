use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Loss function selector for configuration files and flags.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LossKind {
    Mse,
    Bce,
}

impl Default for LossKind {
    fn default() -> Self {
        LossKind::Mse
    }
}

impl LossKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LossKind::Mse => "mse",
            LossKind::Bce => "bce",
        }
    }
}

impl FromStr for LossKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mse" => Ok(LossKind::Mse),
            "bce" => Ok(LossKind::Bce),
            _ => Err(format!("Unknown loss kind: {}. Expected `mse` or `bce`", s)),
        }
    }
}

/// Optimizer selector for configuration files and flags.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Sgd,
    Adam,
}

impl Default for OptimizerKind {
    fn default() -> Self {
        OptimizerKind::Sgd
    }
}

impl OptimizerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizerKind::Sgd => "sgd",
            OptimizerKind::Adam => "adam",
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sgd" => Ok(OptimizerKind::Sgd),
            "adam" => Ok(OptimizerKind::Adam),
            _ => Err(format!(
                "Unknown optimizer kind: {}. Expected `sgd` or `adam`",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_kind_from_str_is_case_insensitive() {
        assert_eq!(LossKind::from_str("MSE").unwrap(), LossKind::Mse);
        assert_eq!(LossKind::from_str("bce").unwrap(), LossKind::Bce);
        assert!(LossKind::from_str("hinge").is_err());
    }

    #[test]
    fn optimizer_kind_round_trips_through_as_str() {
        for kind in [OptimizerKind::Sgd, OptimizerKind::Adam] {
            assert_eq!(OptimizerKind::from_str(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn defaults_match_the_training_demo() {
        assert_eq!(LossKind::default(), LossKind::Mse);
        assert_eq!(OptimizerKind::default(), OptimizerKind::Sgd);
    }
}
