use serde::Deserialize;
use std::env;
use std::sync::Arc;

use crate::dice::{
    AdvantageRoll, BulkSource, DisadvantageRoll, FastSource, RandomSource, RollStrategy, SecureSource, SingleRoll,
    SumOfN,
};
use crate::error::DiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RandomSourceKind {
    Secure,
    Fast,
    Bulk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollStrategyKind {
    Single,
    Advantage,
    Disadvantage,
    Sum,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiceConfig {
    pub random_source: RandomSourceKind,
    pub seed: Option<u64>,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RollConfig {
    pub strategy: RollStrategyKind,
    pub times: u32,
    pub modifier: i64,
    pub threshold: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub dice: DiceConfig,
    pub roll: RollConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = env::var("RUN_ENV").unwrap_or_else(|_| "local".into());

        let builder = ::config::Config::builder()
            .add_source(config::File::with_name("config/default.toml"))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::File::with_name("config/local.toml").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        builder.build()?.try_deserialize()
    }
}

impl DiceConfig {
    /// A seed is ignored by the secure source.
    pub fn build_source(&self) -> Arc<dyn RandomSource> {
        match (self.random_source, self.seed) {
            (RandomSourceKind::Secure, seed) => {
                if seed.is_some() {
                    tracing::warn!("seed is ignored by the secure random source");
                }
                Arc::new(SecureSource::new())
            }
            (RandomSourceKind::Fast, Some(seed)) => Arc::new(FastSource::seeded(seed)),
            (RandomSourceKind::Fast, None) => Arc::new(FastSource::new()),
            (RandomSourceKind::Bulk, Some(seed)) => Arc::new(BulkSource::seeded(seed).with_batch_size(self.batch_size)),
            (RandomSourceKind::Bulk, None) => Arc::new(BulkSource::new().with_batch_size(self.batch_size)),
        }
    }
}

impl RollConfig {
    pub fn build_strategy(&self) -> Result<Arc<dyn RollStrategy>, DiceError> {
        let strategy: Arc<dyn RollStrategy> = match self.strategy {
            RollStrategyKind::Single => Arc::new(SingleRoll),
            RollStrategyKind::Advantage => Arc::new(AdvantageRoll),
            RollStrategyKind::Disadvantage => Arc::new(DisadvantageRoll),
            RollStrategyKind::Sum => SumOfN::shared(self.times)?,
        };
        Ok(strategy)
    }
}
