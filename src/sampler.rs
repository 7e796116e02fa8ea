//! Spatial sample generator - random weighted points in a disk
//!
//! Stand-in data for the thematic layers. Positions are uniform over the disk
//! area and weights are independent uniform draws, so there is no spatial
//! structure in the field.

use crate::error::MapError;
use crate::geo::{Coordinate, WeightedPoint, METERS_PER_DEGREE};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Points generated for one layer, fixed for the lifetime of a mount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThematicDataset {
    pub center: Coordinate,
    pub radius_m: f64,
    pub count: usize,
    pub points: Vec<WeightedPoint>,
}

impl ThematicDataset {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Mean weight, 0 for an empty dataset
    pub fn mean_weight(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().map(|p| p.weight).sum::<f64>() / self.points.len() as f64
    }
}

/// Sample `count` points within `radius_m` of `center` using the thread RNG
pub fn generate(center: Coordinate, radius_m: f64, count: usize) -> Result<ThematicDataset, MapError> {
    generate_with(&mut rand::thread_rng(), center, radius_m, count)
}

/// Same as [`generate`] with a caller-supplied RNG
pub fn generate_with<R: Rng + ?Sized>(
    rng: &mut R,
    center: Coordinate,
    radius_m: f64,
    count: usize,
) -> Result<ThematicDataset, MapError> {
    if !radius_m.is_finite() || radius_m <= 0.0 {
        return Err(MapError::InvalidRadius(radius_m));
    }

    let radius_deg = radius_m / METERS_PER_DEGREE;
    let points = (0..count)
        .map(|_| {
            let u: f64 = rng.gen();
            let v: f64 = rng.gen();
            // sqrt(u) keeps the density uniform over area
            let r = radius_deg * u.sqrt();
            let theta = 2.0 * PI * v;
            WeightedPoint {
                lat: center.lat + r * theta.sin(),
                lon: center.lon + r * theta.cos(),
                weight: rng.gen(),
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        "Generated {} points around ({:.4}, {:.4}) radius {} m",
        points.len(),
        center.lat,
        center.lon,
        radius_m
    );

    Ok(ThematicDataset {
        center,
        radius_m,
        count,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SAO_PAULO: Coordinate = Coordinate::new(-23.5505, -46.6333);

    #[test]
    fn test_count_bounds_and_weights() {
        let ds = generate(SAO_PAULO, 8000.0, 200).unwrap();
        assert_eq!(ds.len(), 200);
        assert_eq!(ds.count, 200);
        for p in &ds.points {
            assert!(p.coordinate().approx_distance_m(&SAO_PAULO) <= 8000.0 + 1e-6);
            assert!((0.0..=1.0).contains(&p.weight));
        }
    }

    #[test]
    fn test_zero_count_is_empty() {
        let ds = generate(SAO_PAULO, 1000.0, 0).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.mean_weight(), 0.0);
    }

    #[test]
    fn test_rejects_bad_radius() {
        assert_eq!(generate(SAO_PAULO, 0.0, 5), Err(MapError::InvalidRadius(0.0)));
        assert!(generate(SAO_PAULO, -10.0, 5).is_err());
        assert!(generate(SAO_PAULO, f64::NAN, 5).is_err());
        assert!(generate(SAO_PAULO, f64::INFINITY, 5).is_err());
    }

    #[test]
    fn test_area_uniform_not_center_biased() {
        // Uniform over area: about a quarter of the samples fall inside half the radius.
        // A linear radial scale would put about half there.
        let mut rng = StdRng::seed_from_u64(7);
        let ds = generate_with(&mut rng, SAO_PAULO, 10_000.0, 4000).unwrap();
        let inner = ds
            .points
            .iter()
            .filter(|p| p.coordinate().approx_distance_m(&SAO_PAULO) <= 5000.0)
            .count();
        let frac = inner as f64 / ds.len() as f64;
        assert!(frac > 0.18 && frac < 0.32, "inner fraction {}", frac);
    }
}
