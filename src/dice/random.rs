use std::fmt;
use std::sync::Mutex;

use rand::rngs::{OsRng, SmallRng, StdRng};
use rand::{Rng, SeedableRng, TryRngCore};

use crate::error::DiceError;

pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Produces uniformly distributed integers in an inclusive range.
///
/// Sources take `&self` so that one instance can back every die a factory
/// hands out. Any generator state is kept behind a lock.
pub trait RandomSource: fmt::Debug + Send + Sync {
    fn draw(&self, smallest: i64, biggest: i64) -> Result<i64, DiceError>;

    fn name(&self) -> &'static str;
}

fn check_range(smallest: i64, biggest: i64) -> Result<(), DiceError> {
    if smallest > biggest {
        return Err(DiceError::InvalidRange { smallest, biggest });
    }
    Ok(())
}

/// Maps uniform 64-bit words onto `smallest..=biggest` with a widening
/// multiply, rejecting words that fall in the biased low zone.
fn map_words(
    smallest: i64,
    biggest: i64,
    mut next_word: impl FnMut() -> Result<u64, DiceError>,
) -> Result<i64, DiceError> {
    check_range(smallest, biggest)?;
    let span = (biggest as i128 - smallest as i128 + 1) as u128;

    // Full i64 range: every word is already uniform.
    if span > u64::MAX as u128 {
        return Ok(next_word()? as i64);
    }

    let span = span as u64;
    let zone = span.wrapping_neg() % span;
    loop {
        let product = next_word()? as u128 * span as u128;
        if (product as u64) >= zone {
            let offset = (product >> 64) as i128;
            return Ok((smallest as i128 + offset) as i64);
        }
    }
}

/// Reads straight from the operating system's entropy source. Nothing is
/// reproducible and nothing is kept between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureSource;

impl SecureSource {
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for SecureSource {
    fn draw(&self, smallest: i64, biggest: i64) -> Result<i64, DiceError> {
        map_words(smallest, biggest, || {
            OsRng.try_next_u64().map_err(|e| DiceError::Entropy(e.to_string()))
        })
    }

    fn name(&self) -> &'static str {
        "secure"
    }
}

/// Non-cryptographic generator. Reproducible when built with [`FastSource::seeded`].
#[derive(Debug)]
pub struct FastSource {
    rng: Mutex<SmallRng>,
}

impl FastSource {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_rng(&mut rand::rng())),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl Default for FastSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for FastSource {
    fn draw(&self, smallest: i64, biggest: i64) -> Result<i64, DiceError> {
        check_range(smallest, biggest)?;
        // A poisoned lock only means another draw panicked; the generator itself is intact.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(rng.random_range(smallest..=biggest))
    }

    fn name(&self) -> &'static str {
        "fast"
    }
}

#[derive(Debug)]
struct BulkState {
    rng: StdRng,
    buffer: Vec<u64>,
    cursor: usize,
}

impl BulkState {
    fn next_word(&mut self) -> u64 {
        if self.cursor == self.buffer.len() {
            self.rng.fill(&mut self.buffer[..]);
            self.cursor = 0;
        }
        let word = self.buffer[self.cursor];
        self.cursor += 1;
        word
    }
}

/// Generates random words a batch at a time and serves single draws out of
/// the buffer.
#[derive(Debug)]
pub struct BulkSource {
    state: Mutex<BulkState>,
}

impl BulkSource {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_rng(&mut rand::rng()), DEFAULT_BATCH_SIZE)
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(self, batch_size: usize) -> Self {
        let state = self.state.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        Self::from_rng(state.rng, batch_size)
    }

    fn from_rng(rng: StdRng, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            state: Mutex::new(BulkState {
                rng,
                buffer: vec![0; batch_size],
                // start exhausted so the first draw fills the buffer
                cursor: batch_size,
            }),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).buffer.len()
    }
}

impl Default for BulkSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for BulkSource {
    fn draw(&self, smallest: i64, biggest: i64) -> Result<i64, DiceError> {
        check_range(smallest, biggest)?;
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        map_words(smallest, biggest, || Ok(state.next_word()))
    }

    fn name(&self) -> &'static str {
        "bulk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_stays_in_range(source: &dyn RandomSource, smallest: i64, biggest: i64) {
        for _ in 0..500 {
            let value = source.draw(smallest, biggest).unwrap();
            assert!(
                value >= smallest && value <= biggest,
                "{} source drew {} outside [{}, {}]",
                source.name(),
                value,
                smallest,
                biggest
            );
        }
    }

    #[test]
    fn test_every_source_stays_in_range() {
        let sources: Vec<Box<dyn RandomSource>> = vec![
            Box::new(SecureSource::new()),
            Box::new(FastSource::new()),
            Box::new(BulkSource::new()),
        ];
        for source in &sources {
            assert_stays_in_range(source.as_ref(), 1, 20);
            assert_stays_in_range(source.as_ref(), 0, 9);
            assert_stays_in_range(source.as_ref(), -3, 3);
        }
    }

    #[test]
    fn test_every_source_rejects_inverted_range() {
        let sources: Vec<Box<dyn RandomSource>> = vec![
            Box::new(SecureSource::new()),
            Box::new(FastSource::seeded(1)),
            Box::new(BulkSource::seeded(1)),
        ];
        for source in &sources {
            assert_eq!(
                source.draw(6, 1),
                Err(DiceError::InvalidRange { smallest: 6, biggest: 1 })
            );
        }
    }

    #[test]
    fn test_single_value_range_returns_that_value() {
        assert_eq!(SecureSource::new().draw(7, 7).unwrap(), 7);
        assert_eq!(FastSource::seeded(3).draw(7, 7).unwrap(), 7);
        assert_eq!(BulkSource::seeded(3).draw(7, 7).unwrap(), 7);
    }

    #[test]
    fn test_seeded_fast_source_is_reproducible() {
        let a = FastSource::seeded(42);
        let b = FastSource::seeded(42);
        for _ in 0..100 {
            assert_eq!(a.draw(1, 100).unwrap(), b.draw(1, 100).unwrap());
        }
    }

    #[test]
    fn test_seeded_bulk_source_is_reproducible_across_refills() {
        let a = BulkSource::seeded(7).with_batch_size(4);
        let b = BulkSource::seeded(7).with_batch_size(4);
        // 50 draws crosses many batch boundaries
        for _ in 0..50 {
            assert_eq!(a.draw(1, 6).unwrap(), b.draw(1, 6).unwrap());
        }
    }

    #[test]
    fn test_bulk_batch_size_is_at_least_one() {
        assert_eq!(BulkSource::seeded(0).with_batch_size(0).batch_size(), 1);
        assert_eq!(BulkSource::seeded(0).batch_size(), DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_bulk_source_covers_every_face() {
        let source = BulkSource::seeded(99);
        let mut seen = [false; 6];
        for _ in 0..1000 {
            let face = source.draw(1, 6).unwrap();
            seen[(face - 1) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_secure_source_covers_every_face() {
        let source = SecureSource::new();
        let mut seen = [false; 6];
        for _ in 0..1000 {
            let face = source.draw(1, 6).unwrap();
            seen[(face - 1) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert!(source.draw(i64::MIN, i64::MAX).is_ok());
    }

    #[test]
    fn test_map_words_skips_biased_words() {
        // span 6: zone = 2^64 mod 6 = 4, so a zero word lands in it
        let mut words = vec![0, u64::MAX].into_iter();
        let value = map_words(1, 6, || Ok(words.next().unwrap())).unwrap();
        assert_eq!(value, 6);
        assert_eq!(words.next(), None);
    }

    #[test]
    fn test_bulk_source_handles_full_range() {
        let source = BulkSource::seeded(5);
        assert!(source.draw(i64::MIN, i64::MAX).is_ok());
    }
}
