//! Market density and saturation.
//!
//! Density is the competitor count over the area of the search circle.
//! The saturation score is a piecewise-linear function of density with one
//! segment per [`DensityLevel`]; each segment is capped so the score never
//! decreases as density grows.

use std::f64::consts::PI;

use compete_intel_analytics_models::{DensityLevel, MarketDensity};
use compete_intel_competitor_models::Competitor;

use crate::geo::distance_km;
use crate::round_to;

/// Lower bound of the [`DensityLevel::Medium`] tier, in competitors/km².
pub const MEDIUM_DENSITY_THRESHOLD: f64 = 0.5;
/// Lower bound of the [`DensityLevel::High`] tier, in competitors/km².
pub const HIGH_DENSITY_THRESHOLD: f64 = 1.5;
/// Lower bound of the [`DensityLevel::VeryHigh`] tier, in competitors/km².
pub const VERY_HIGH_DENSITY_THRESHOLD: f64 = 3.0;

/// Computes density, saturation and mean spacing for `competitors` found
/// within `radius_km` of the search point.
#[must_use]
pub fn analyze(competitors: &[Competitor], radius_km: f64) -> MarketDensity {
    let density = competitors_per_km2(competitors.len(), radius_km);
    let (density_level, saturation) = classify(density);

    // With fewer than two competitors there are no pairs; assume they sit
    // a full diameter apart.
    let avg_distance = average_pairwise_distance(competitors).unwrap_or(radius_km * 2.0);

    MarketDensity {
        total_competitors: competitors.len(),
        competitors_per_km2: round_to(density, 2),
        density_level,
        market_saturation_score: round_to(saturation, 1),
        avg_distance_between_competitors: round_to(avg_distance, 2),
    }
}

/// Returns `count / (π · radius_km²)`, or `0.0` when the area is zero.
#[must_use]
pub fn competitors_per_km2(count: usize, radius_km: f64) -> f64 {
    let area_km2 = PI * radius_km.powi(2);
    if area_km2 > 0.0 {
        #[allow(clippy::cast_precision_loss)]
        let count = count as f64;
        count / area_km2
    } else {
        0.0
    }
}

/// Maps a density to its tier and unrounded saturation score.
#[must_use]
pub fn classify(density: f64) -> (DensityLevel, f64) {
    if density < MEDIUM_DENSITY_THRESHOLD {
        (DensityLevel::Low, (density * 40.0).min(25.0))
    } else if density < HIGH_DENSITY_THRESHOLD {
        (
            DensityLevel::Medium,
            25.0 + ((density - MEDIUM_DENSITY_THRESHOLD) * 30.0).min(25.0),
        )
    } else if density < VERY_HIGH_DENSITY_THRESHOLD {
        (
            DensityLevel::High,
            50.0 + ((density - HIGH_DENSITY_THRESHOLD) * 20.0).min(30.0),
        )
    } else {
        (
            DensityLevel::VeryHigh,
            (80.0 + (density - VERY_HIGH_DENSITY_THRESHOLD) * 5.0).min(100.0),
        )
    }
}

/// Mean distance over all unordered pairs of competitors.
///
/// Returns `None` when there are fewer than two competitors. Quadratic in
/// the number of competitors, which is fine for search-sized result sets.
#[must_use]
pub fn average_pairwise_distance(competitors: &[Competitor]) -> Option<f64> {
    if competitors.len() < 2 {
        return None;
    }

    let mut total = 0.0;
    let mut pairs = 0_usize;
    for (i, a) in competitors.iter().enumerate() {
        for b in &competitors[i + 1..] {
            total += distance_km(a.coordinates, b.coordinates);
            pairs += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    Some(total / pairs as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::competitor_at;
    use compete_intel_competitor_models::Coordinates;

    #[test]
    fn density_is_count_over_circle_area() {
        for radius in [0.5, 1.0, 5.0, 12.5, 50.0] {
            for n in [0_usize, 1, 7, 50] {
                #[allow(clippy::cast_precision_loss)]
                let expected = n as f64 / (PI * radius * radius);
                let actual = competitors_per_km2(n, radius);
                assert!(
                    (actual - expected).abs() < 1e-12,
                    "n={n} radius={radius}: {actual} != {expected}"
                );
            }
        }
    }

    #[test]
    fn zero_radius_gives_zero_density() {
        assert!(competitors_per_km2(10, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tiers_match_thresholds() {
        assert_eq!(classify(0.0).0, DensityLevel::Low);
        assert_eq!(classify(0.49).0, DensityLevel::Low);
        assert_eq!(classify(0.5).0, DensityLevel::Medium);
        assert_eq!(classify(1.49).0, DensityLevel::Medium);
        assert_eq!(classify(1.5).0, DensityLevel::High);
        assert_eq!(classify(2.99).0, DensityLevel::High);
        assert_eq!(classify(3.0).0, DensityLevel::VeryHigh);
        assert_eq!(classify(40.0).0, DensityLevel::VeryHigh);
    }

    #[test]
    fn score_is_continuous_at_upper_tier_boundaries() {
        let eps = 1e-9;
        for boundary in [HIGH_DENSITY_THRESHOLD, VERY_HIGH_DENSITY_THRESHOLD] {
            let below = classify(boundary - eps).1;
            let above = classify(boundary).1;
            assert!(
                (below - above).abs() < 1e-6,
                "discontinuity at {boundary}: {below} vs {above}"
            );
        }
    }

    #[test]
    fn score_steps_up_into_medium_tier() {
        let below = classify(MEDIUM_DENSITY_THRESHOLD - 1e-9).1;
        let at = classify(MEDIUM_DENSITY_THRESHOLD).1;
        assert!((below - 20.0).abs() < 1e-6);
        assert!((at - 25.0).abs() < 1e-6);
    }

    #[test]
    fn score_is_monotonic_and_bounded() {
        let mut previous = classify(0.0).1;
        for step in 1..=2000_i32 {
            let density = f64::from(step) * 0.01;
            let score = classify(density).1;
            assert!(
                score >= previous,
                "score decreased at density {density}: {previous} -> {score}"
            );
            assert!((0.0..=100.0).contains(&score));
            previous = score;
        }
        assert!((classify(1_000.0).1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_market_uses_diameter_fallback() {
        let density = analyze(&[], 5.0);
        assert_eq!(density.total_competitors, 0);
        assert!(density.competitors_per_km2.abs() < f64::EPSILON);
        assert_eq!(density.density_level, DensityLevel::Low);
        assert!(density.market_saturation_score.abs() < f64::EPSILON);
        assert!((density.avg_distance_between_competitors - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn single_competitor_uses_diameter_fallback() {
        let density = analyze(&[competitor_at("a", -23.55, -46.63)], 2.0);
        assert!((density.avg_distance_between_competitors - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ten_close_competitors_in_five_km() {
        let competitors: Vec<_> = (0..10_i32)
            .map(|i| competitor_at(&format!("c{i}"), -23.55 + f64::from(i) * 0.0005, -46.63))
            .collect();
        let density = analyze(&competitors, 5.0);

        assert!((density.competitors_per_km2 - 0.13).abs() < 1e-9);
        assert_eq!(density.density_level, DensityLevel::Low);
        assert!((density.market_saturation_score - 5.1).abs() < 0.05);
        assert!(density.avg_distance_between_competitors < 1.0);
    }

    #[test]
    fn pairwise_mean_of_three_points() {
        let a = competitor_at("a", 0.0, 0.0);
        let b = competitor_at("b", 1.0, 0.0);
        let c = competitor_at("c", 2.0, 0.0);
        let mean = average_pairwise_distance(&[a, b, c]).unwrap();
        // pairs: 1°, 2°, 1° of latitude
        let one_degree = distance_km(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 0.0));
        assert!((mean - one_degree * 4.0 / 3.0).abs() < 1e-6);
    }
}
