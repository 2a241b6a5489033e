use std::fmt;
use std::sync::Arc;

use crate::error::DiceError;

use super::random::{RandomSource, SecureSource};
use super::strategy::{RollStrategy, SingleRoll};

/// An immutable die covering the faces `smallest_side..=biggest_side`.
///
/// A die owns the source it draws from and the strategy it rolls with.
/// Clones share both. To roll differently either pass an override to
/// [`Die::roll`] or build a new die with [`Die::with_roll_strategy`].
#[derive(Clone)]
pub struct Die {
    smallest_side: i64,
    biggest_side: i64,
    random_source: Arc<dyn RandomSource>,
    roll_strategy: Arc<dyn RollStrategy>,
}

impl Die {
    /// A die backed by [`SecureSource`] and rolled with [`SingleRoll`].
    pub fn new(smallest_side: i64, biggest_side: i64) -> Result<Self, DiceError> {
        Self::with_strategies(
            smallest_side,
            biggest_side,
            Arc::new(SecureSource::new()),
            Arc::new(SingleRoll),
        )
    }

    pub fn with_strategies(
        smallest_side: i64,
        biggest_side: i64,
        random_source: Arc<dyn RandomSource>,
        roll_strategy: Arc<dyn RollStrategy>,
    ) -> Result<Self, DiceError> {
        if smallest_side < 0 || smallest_side >= biggest_side {
            tracing::warn!(smallest_side, biggest_side, "rejected die with invalid sides");
            return Err(DiceError::Validation {
                smallest: smallest_side,
                biggest: biggest_side,
            });
        }
        Ok(Self {
            smallest_side,
            biggest_side,
            random_source,
            roll_strategy,
        })
    }

    // Getters
    pub fn smallest_side(&self) -> i64 {
        self.smallest_side
    }

    pub fn biggest_side(&self) -> i64 {
        self.biggest_side
    }

    pub fn face_count(&self) -> u64 {
        (self.biggest_side - self.smallest_side) as u64 + 1
    }

    pub fn random_source(&self) -> &Arc<dyn RandomSource> {
        &self.random_source
    }

    pub fn roll_strategy(&self) -> &Arc<dyn RollStrategy> {
        &self.roll_strategy
    }

    //  --- Derived dice ---
    pub fn with_random_source(self, random_source: Arc<dyn RandomSource>) -> Self {
        Self { random_source, ..self }
    }

    pub fn with_roll_strategy(self, roll_strategy: Arc<dyn RollStrategy>) -> Self {
        Self { roll_strategy, ..self }
    }

    //  --- Rolling ---

    /// One raw draw over the die's faces, no strategy and no modifier.
    pub fn draw(&self) -> Result<i64, DiceError> {
        self.random_source.draw(self.smallest_side, self.biggest_side)
    }

    /// Rolls with `override_strategy` when given, otherwise with the bound
    /// strategy. The result is not clamped to the face range.
    #[tracing::instrument(level = "debug", skip(self, override_strategy), fields(die = %self))]
    pub fn roll(&self, modifier: i64, override_strategy: Option<&dyn RollStrategy>) -> Result<i64, DiceError> {
        let strategy = override_strategy.unwrap_or(&*self.roll_strategy);
        let result = strategy.roll(self, modifier)?;
        tracing::debug!(strategy = strategy.name(), result, "rolled");
        Ok(result)
    }

    /// True when an unmodified roll meets or beats `threshold`.
    pub fn check_success(&self, threshold: i64, override_strategy: Option<&dyn RollStrategy>) -> Result<bool, DiceError> {
        Ok(self.roll(0, override_strategy)? >= threshold)
    }
}

impl fmt::Debug for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Die")
            .field("smallest_side", &self.smallest_side)
            .field("biggest_side", &self.biggest_side)
            .field("random_source", &self.random_source.name())
            .field("roll_strategy", &self.roll_strategy.name())
            .finish()
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..={}]", self.smallest_side, self.biggest_side)
    }
}
