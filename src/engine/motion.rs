use rand::Rng;

use crate::error::MapError;
use crate::models::coordinate::Coordinate;

pub const DEFAULT_JITTER_DEG: f64 = 0.005;

/// Emulates driver motion by perturbing a base coordinate.
#[derive(Debug, Clone, Copy)]
pub struct PositionSampler {
    jitter_deg: f64,
}

impl Default for PositionSampler {
    fn default() -> Self {
        Self {
            jitter_deg: DEFAULT_JITTER_DEG,
        }
    }
}

impl PositionSampler {
    pub fn new(jitter_deg: f64) -> Result<Self, MapError> {
        if !jitter_deg.is_finite() {
            return Err(MapError::InvalidCoordinate(format!(
                "position jitter must be finite, got {jitter_deg}"
            )));
        }

        Ok(Self {
            jitter_deg: jitter_deg.abs(),
        })
    }

    pub fn sample<R: Rng>(&self, base: &Coordinate, rng: &mut R) -> Coordinate {
        if self.jitter_deg == 0.0 {
            return *base;
        }

        let d_lat = rng.gen_range(-self.jitter_deg..=self.jitter_deg);
        let d_lng = rng.gen_range(-self.jitter_deg..=self.jitter_deg);
        base.offset(d_lat, d_lng)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn samples_stay_within_jitter() {
        let base = Coordinate::new(37.7749, -122.4194).unwrap();
        let sampler = PositionSampler::default();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..500 {
            let p = sampler.sample(&base, &mut rng);
            assert!((p.latitude - base.latitude).abs() <= DEFAULT_JITTER_DEG + 1e-12);
            assert!((p.longitude - base.longitude).abs() <= DEFAULT_JITTER_DEG + 1e-12);
        }
    }

    #[test]
    fn seeded_samples_are_reproducible() {
        let base = Coordinate::new(37.7749, -122.4194).unwrap();
        let sampler = PositionSampler::default();

        let a = sampler.sample(&base, &mut StdRng::seed_from_u64(9));
        let b = sampler.sample(&base, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn zero_jitter_returns_base() {
        let base = Coordinate::new(1.0, 2.0).unwrap();
        let p = PositionSampler::new(0.0)
            .unwrap()
            .sample(&base, &mut StdRng::seed_from_u64(1));
        assert_eq!(p, base);
    }

    #[test]
    fn non_finite_jitter_is_rejected() {
        assert!(PositionSampler::new(f64::NAN).is_err());
        assert!(PositionSampler::new(f64::INFINITY).is_err());
        assert!(PositionSampler::new(-0.01).is_ok());
    }
}
