use dice_roller::{config::Config, dice::DiceFactory, error::AppError, roll_standard_set};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<(), AppError> {
    let env: String = env::var("RUN_ENV").unwrap_or_else(|_| "default".into());
    let config: Config = Config::load()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.logging.level.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    tracing::info!(run_env = %env, source = ?config.dice.random_source, "Rolling the standard dice set...");

    let factory = DiceFactory::new(config.dice.build_source());
    let results = roll_standard_set(&factory, &config.roll)?;
    tracing::info!(dice = results.len(), "Done");

    if let Some(threshold) = config.roll.threshold {
        let d20 = factory.d20();
        let strategy = config.roll.build_strategy()?;
        let success = d20.check_success(threshold, Some(strategy.as_ref()))?;
        tracing::info!(threshold, success, "d20 check");
    }

    Ok(())
}
