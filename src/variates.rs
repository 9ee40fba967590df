use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

use crate::error::{Error, Result};

/// Exponential distribution with a rate checked at construction, so draws
/// inside the event loop cannot fail.
#[derive(Clone, Copy, Debug)]
pub struct Exponential {
    dist: Exp<f64>,
}

impl Exponential {
    pub fn new(rate: f64) -> Result<Self> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(Error::InvalidRate(rate));
        }
        let dist = Exp::new(rate).map_err(|_| Error::InvalidRate(rate))?;
        Ok(Self { dist })
    }
}

pub struct VariateGenerator {
    rng: StdRng,
}

impl VariateGenerator {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn exponential(&mut self, dist: &Exponential) -> f64 {
        dist.dist.sample(&mut self.rng)
    }

    /// Uniform category in `[0, groups)`.
    pub fn category(&mut self, groups: usize) -> usize {
        self.rng.gen_range(0..groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_rates() {
        assert!(Exponential::new(0.0).is_err());
        assert!(Exponential::new(-1.0).is_err());
        assert!(Exponential::new(f64::NAN).is_err());
        assert!(Exponential::new(f64::INFINITY).is_err());
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let dist = Exponential::new(2.0).unwrap();
        let mut a = VariateGenerator::seeded(42);
        let mut b = VariateGenerator::seeded(42);
        for _ in 0..100 {
            assert_eq!(a.exponential(&dist).to_bits(), b.exponential(&dist).to_bits());
            assert_eq!(a.category(6), b.category(6));
        }
    }

    #[test]
    fn sample_mean_tracks_inverse_rate() {
        let dist = Exponential::new(0.5).unwrap();
        let mut variates = VariateGenerator::seeded(7);
        let n = 50_000;
        let total: f64 = (0..n).map(|_| variates.exponential(&dist)).sum();
        let mean = total / f64::from(n);
        assert!((mean - 2.0).abs() < 0.1, "mean was {}", mean);
    }

    #[test]
    fn draws_are_positive_and_categories_in_range() {
        let dist = Exponential::new(3.0).unwrap();
        let mut variates = VariateGenerator::seeded(1);
        for _ in 0..1_000 {
            assert!(variates.exponential(&dist) >= 0.0);
            assert!(variates.category(3) < 3);
        }
    }
}
