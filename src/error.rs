use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiceError {
    #[error("Incorrect sides: smallest side ({smallest}) must be non-negative and less than biggest side ({biggest})")]
    Validation { smallest: i64, biggest: i64 },

    #[error("Invalid roll strategy configuration: {0}")]
    Configuration(String),

    #[error("Cannot draw from empty range [{smallest}, {biggest}]")]
    InvalidRange { smallest: i64, biggest: i64 },

    #[error("Entropy source failure: {0}")]
    Entropy(String),

    #[error("Roll result overflowed")]
    Overflow,

    #[error("Unknown die: {0}")]
    UnknownDie(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Dice error: {0}")]
    Dice(#[from] DiceError),
}
