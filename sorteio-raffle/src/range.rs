use crate::{RaffleError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sorteio_core::Draw;

/// Inclusive integer range a number is drawn from. Always `min < max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRange {
    min: i64,
    max: i64,
}

impl DrawRange {
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min >= max {
            return Err(RaffleError::invalid_range(min, max));
        }
        // the width has to stay representable for the pseudo-number arithmetic
        if max.checked_sub(min).and_then(|d| d.checked_add(1)).is_none() {
            return Err(RaffleError::invalid_range(min, max));
        }
        Ok(Self { min, max })
    }

    /// Parse operator input. Surrounding whitespace is ignored; anything
    /// that is not an integer is rejected.
    pub fn parse(min: &str, max: &str) -> Result<Self> {
        let invalid = || RaffleError::invalid_range(min.trim(), max.trim());
        let lo = min.trim().parse::<i64>().map_err(|_| invalid())?;
        let hi = max.trim().parse::<i64>().map_err(|_| invalid())?;
        Self::new(lo, hi)
    }

    pub fn of(draw: &Draw) -> Result<Self> {
        Self::new(draw.min, draw.max)
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Number of values in the range
    pub fn width(&self) -> i64 {
        self.max - self.min + 1
    }

    pub fn contains(&self, number: i64) -> bool {
        (self.min..=self.max).contains(&number)
    }

    /// Uniform sample from `[min, max]`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        rng.gen_range(self.min..=self.max)
    }
}

impl std::fmt::Display for DrawRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_bounds() {
        assert!(DrawRange::new(5, 5).is_err());
        assert!(DrawRange::new(10, 1).is_err());
        assert!(DrawRange::new(i64::MIN, i64::MAX).is_err());
        assert!(DrawRange::new(-3, 3).is_ok());
    }

    #[test]
    fn test_parse() {
        let range = DrawRange::parse(" 1 ", "10").unwrap();
        assert_eq!((range.min(), range.max(), range.width()), (1, 10, 10));

        let rejected = [
            ("", "10"),
            ("a", "10"),
            ("1", "x"),
            ("1.5", "3"),
            ("10", "1"),
            ("4", "4"),
        ];
        for (min, max) in rejected {
            assert!(
                matches!(DrawRange::parse(min, max), Err(RaffleError::InvalidRange { .. })),
                "{:?} should be rejected",
                (min, max)
            );
        }
    }

    #[test]
    fn test_sample_stays_in_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let a: i64 = rng.gen_range(-1_000_000..1_000_000);
            let b: i64 = rng.gen_range(-1_000_000..1_000_000);
            if a == b {
                continue;
            }
            let range = DrawRange::new(a.min(b), a.max(b)).unwrap();
            for _ in 0..20 {
                let n = range.sample(&mut rng);
                assert!(range.contains(n), "{} outside {}", n, range);
            }
        }
    }

    #[test]
    fn test_sample_reaches_both_ends() {
        let range = DrawRange::new(1, 2).unwrap();
        let mut rng = rand::thread_rng();
        let samples: Vec<i64> = (0..200).map(|_| range.sample(&mut rng)).collect();
        assert!(samples.contains(&1));
        assert!(samples.contains(&2));
    }
}
