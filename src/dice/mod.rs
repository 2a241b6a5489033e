pub mod die;
pub mod factory;
pub mod random;
pub mod strategy;


pub use die::Die;
pub use factory::{DiceFactory, DieKind};
pub use random::{BulkSource, FastSource, RandomSource, SecureSource};
pub use strategy::{AdvantageRoll, DisadvantageRoll, RollStrategy, SingleRoll, SumOfN};
