use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::DiceError;

use super::die::Die;
use super::random::RandomSource;
use super::strategy::{RollStrategy, SingleRoll};

/// The standard RPG dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DieKind {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DieKind {
    pub const ALL: [DieKind; 6] = [DieKind::D4, DieKind::D6, DieKind::D8, DieKind::D10, DieKind::D12, DieKind::D20];

    /// Face range as `(smallest, biggest)`. The d10 runs 0-9 so two of them
    /// read as percentile dice.
    pub fn sides(&self) -> (i64, i64) {
        match self {
            DieKind::D4 => (1, 4),
            DieKind::D6 => (1, 6),
            DieKind::D8 => (1, 8),
            DieKind::D10 => (0, 9),
            DieKind::D12 => (1, 12),
            DieKind::D20 => (1, 20),
        }
    }
}

impl fmt::Display for DieKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DieKind::D4 => "d4",
            DieKind::D6 => "d6",
            DieKind::D8 => "d8",
            DieKind::D10 => "d10",
            DieKind::D12 => "d12",
            DieKind::D20 => "d20",
        };
        f.write_str(name)
    }
}

impl FromStr for DieKind {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DieKind::ALL
            .into_iter()
            .find(|kind| kind.to_string() == wanted)
            .ok_or_else(|| DiceError::UnknownDie(s.to_string()))
    }
}

/// Builds standard dice that all draw from one shared source.
#[derive(Debug, Clone)]
pub struct DiceFactory {
    random_source: Arc<dyn RandomSource>,
    shared_strategy: Option<Arc<dyn RollStrategy>>,
}

impl DiceFactory {
    pub fn new(random_source: Arc<dyn RandomSource>) -> Self {
        Self {
            random_source,
            shared_strategy: None,
        }
    }

    /// Every die built afterwards rolls with this one strategy instance.
    pub fn with_roll_strategy(self, strategy: Arc<dyn RollStrategy>) -> Self {
        Self {
            shared_strategy: Some(strategy),
            ..self
        }
    }

    pub fn random_source(&self) -> &Arc<dyn RandomSource> {
        &self.random_source
    }

    pub fn make_die(&self, smallest_side: i64, biggest_side: i64) -> Result<Die, DiceError> {
        let strategy = match &self.shared_strategy {
            Some(strategy) => Arc::clone(strategy),
            None => Arc::new(SingleRoll),
        };
        Die::with_strategies(smallest_side, biggest_side, Arc::clone(&self.random_source), strategy)
    }

    pub fn make(&self, kind: DieKind) -> Die {
        let (smallest, biggest) = kind.sides();
        // The table only holds valid ranges.
        match self.make_die(smallest, biggest) {
            Ok(die) => die,
            Err(e) => unreachable!("standard {} has invalid sides: {}", kind, e),
        }
    }

    pub fn d4(&self) -> Die {
        self.make(DieKind::D4)
    }

    pub fn d6(&self) -> Die {
        self.make(DieKind::D6)
    }

    pub fn d8(&self) -> Die {
        self.make(DieKind::D8)
    }

    pub fn d10(&self) -> Die {
        self.make(DieKind::D10)
    }

    pub fn d12(&self) -> Die {
        self.make(DieKind::D12)
    }

    pub fn d20(&self) -> Die {
        self.make(DieKind::D20)
    }

    #[tracing::instrument(skip(self), fields(source = self.random_source.name()))]
    pub fn dice_set(&self) -> BTreeMap<DieKind, Die> {
        DieKind::ALL.into_iter().map(|kind| (kind, self.make(kind))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::random::FastSource;
    use crate::dice::strategy::SumOfN;

    fn factory() -> DiceFactory {
        DiceFactory::new(Arc::new(FastSource::seeded(8)))
    }

    #[test]
    fn test_standard_dice_have_expected_sides() {
        let factory = factory();
        assert_eq!(factory.d4().biggest_side(), 4);
        assert_eq!(factory.d6().biggest_side(), 6);
        assert_eq!(factory.d8().biggest_side(), 8);
        assert_eq!(factory.d12().biggest_side(), 12);
        assert_eq!(factory.d20().biggest_side(), 20);

        let d10 = factory.d10();
        assert_eq!((d10.smallest_side(), d10.biggest_side()), (0, 9));
    }

    #[test]
    fn test_dice_set_contains_every_kind() {
        let set = factory().dice_set();
        assert_eq!(set.len(), 6);
        let names: Vec<String> = set.keys().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["d4", "d6", "d8", "d10", "d12", "d20"]);
    }

    #[test]
    fn test_dice_share_source_but_not_strategy() {
        let factory = factory();
        let a = factory.d6();
        let b = factory.d20();
        assert!(Arc::ptr_eq(a.random_source(), factory.random_source()));
        assert!(Arc::ptr_eq(a.random_source(), b.random_source()));
        assert!(!Arc::ptr_eq(a.roll_strategy(), b.roll_strategy()));
    }

    #[test]
    fn test_shared_strategy_is_explicit() {
        let sum: Arc<dyn RollStrategy> = Arc::new(SumOfN::new(2).unwrap());
        let factory = factory().with_roll_strategy(Arc::clone(&sum));
        let set = factory.dice_set();
        assert!(set.values().all(|die| Arc::ptr_eq(die.roll_strategy(), &sum)));
    }

    #[test]
    fn test_make_die_validates() {
        assert!(matches!(factory().make_die(3, 3), Err(DiceError::Validation { .. })));
    }

    #[test]
    fn test_die_kind_parses_names() {
        assert_eq!("d10".parse::<DieKind>().unwrap(), DieKind::D10);
        assert_eq!(" D20 ".parse::<DieKind>().unwrap(), DieKind::D20);
        assert_eq!("d7".parse::<DieKind>(), Err(DiceError::UnknownDie("d7".to_string())));
    }
}
