pub mod config;
pub mod dice;
pub mod error;

use std::collections::BTreeMap;

use crate::config::RollConfig;
use crate::dice::{DiceFactory, DieKind};
use crate::error::DiceError;

/// Rolls the factory's standard set once with the configured strategy and modifier.
#[tracing::instrument(skip(factory, roll))]
pub fn roll_standard_set(factory: &DiceFactory, roll: &RollConfig) -> Result<BTreeMap<DieKind, i64>, DiceError> {
    let strategy = roll.build_strategy()?;

    factory
        .dice_set()
        .into_iter()
        .map(|(kind, die)| {
            let result = die.roll(roll.modifier, Some(strategy.as_ref()))?;
            tracing::info!(die = %kind, strategy = strategy.name(), modifier = roll.modifier, result, "Rolled");
            Ok::<_, DiceError>((kind, result))
        })
        .collect()
}
