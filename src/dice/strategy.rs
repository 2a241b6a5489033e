use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex};

use crate::error::DiceError;

use super::die::Die;

/// Combines one or more draws from a die into a single result, then applies the modifier.
pub trait RollStrategy: fmt::Debug + Send + Sync {
    fn roll(&self, die: &Die, modifier: i64) -> Result<i64, DiceError>;

    fn name(&self) -> &'static str;
}

fn apply_modifier(value: i64, modifier: i64) -> Result<i64, DiceError> {
    value.checked_add(modifier).ok_or(DiceError::Overflow)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SingleRoll;

impl RollStrategy for SingleRoll {
    fn roll(&self, die: &Die, modifier: i64) -> Result<i64, DiceError> {
        apply_modifier(die.draw()?, modifier)
    }

    fn name(&self) -> &'static str {
        "single"
    }
}

/// Two independent draws, keep the lower.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DisadvantageRoll;

impl RollStrategy for DisadvantageRoll {
    fn roll(&self, die: &Die, modifier: i64) -> Result<i64, DiceError> {
        let first = die.draw()?;
        let second = die.draw()?;
        apply_modifier(first.min(second), modifier)
    }

    fn name(&self) -> &'static str {
        "disadvantage"
    }
}

/// Two independent draws, keep the higher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AdvantageRoll;

impl RollStrategy for AdvantageRoll {
    fn roll(&self, die: &Die, modifier: i64) -> Result<i64, DiceError> {
        let first = die.draw()?;
        let second = die.draw()?;
        apply_modifier(first.max(second), modifier)
    }

    fn name(&self) -> &'static str {
        "advantage"
    }
}

static SHARED_SUMS: LazyLock<Mutex<HashMap<u32, Arc<SumOfN>>>> = LazyLock::new(|| Mutex::new(HashMap::new()));

/// Sums `times` draws of the same die.
///
/// Equality and hashing only look at `times`, so two instances built with
/// the same count are interchangeable. [`SumOfN::shared`] hands out one
/// instance per count from a process-wide cache; [`SumOfN::new`] always
/// builds a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SumOfN {
    times: u32,
}

impl SumOfN {
    pub fn new(times: u32) -> Result<Self, DiceError> {
        if times == 0 {
            return Err(DiceError::Configuration(
                "sum-of-n strategy needs at least one draw".to_string(),
            ));
        }
        Ok(Self { times })
    }

    #[tracing::instrument]
    pub fn shared(times: u32) -> Result<Arc<Self>, DiceError> {
        let strategy = Self::new(times)?;
        let mut cache = SHARED_SUMS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let shared = cache.entry(times).or_insert_with(|| {
            tracing::trace!(times, "caching new sum-of-n strategy");
            Arc::new(strategy)
        });
        Ok(Arc::clone(shared))
    }

    /// Drops every cached instance. Handles already given out stay valid.
    pub fn clear_shared() {
        SHARED_SUMS.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clear();
    }

    #[cfg(test)]
    pub(crate) fn shared_count() -> usize {
        SHARED_SUMS.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn times(&self) -> u32 {
        self.times
    }
}

impl Default for SumOfN {
    fn default() -> Self {
        Self { times: 1 }
    }
}

impl RollStrategy for SumOfN {
    fn roll(&self, die: &Die, modifier: i64) -> Result<i64, DiceError> {
        let mut total: i64 = 0;
        for _ in 0..self.times {
            total = total.checked_add(die.draw()?).ok_or(DiceError::Overflow)?;
        }
        apply_modifier(total, modifier)
    }

    fn name(&self) -> &'static str {
        "sum"
    }
}

impl fmt::Display for SumOfN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sum of {}", self.times)
    }
}
