//! Revenue-based market share and CR3 concentration.

use compete_intel_analytics_models::{
    CallerBusinessProfile, MarketShareEstimate, MarketStructure, TopCompetitorShare,
};
use compete_intel_competitor_models::Competitor;

use crate::round_to;

/// Number of leading competitors in the concentration ratio.
pub const TOP_N: usize = 3;
/// CR3 at or above which a market is [`MarketStructure::Moderate`].
pub const MODERATE_CR3: f64 = 40.0;
/// CR3 at or above which a market is [`MarketStructure::Concentrated`].
pub const CONCENTRATED_CR3: f64 = 70.0;

/// Estimates market shares, or `None` when there are no competitors.
///
/// Total market revenue includes the caller when present. Competitors with
/// equal revenue keep their input order.
#[must_use]
pub fn estimate(
    caller: Option<&CallerBusinessProfile>,
    competitors: &[Competitor],
) -> Option<MarketShareEstimate> {
    if competitors.is_empty() {
        return None;
    }

    let caller_revenue = caller.map_or(0, |c| c.estimated_monthly_revenue);
    let total = competitors
        .iter()
        .map(|c| c.estimated_monthly_revenue)
        .sum::<u64>()
        + caller_revenue;

    let mut ranked: Vec<&Competitor> = competitors.iter().collect();
    ranked.sort_by(|a, b| b.estimated_monthly_revenue.cmp(&a.estimated_monthly_revenue));
    ranked.truncate(TOP_N);

    let top_revenue: u64 = ranked.iter().map(|c| c.estimated_monthly_revenue).sum();
    let cr3 = share_percent(top_revenue, total);

    let top_3_competitors = ranked
        .into_iter()
        .map(|c| TopCompetitorShare {
            name: c.name.clone(),
            estimated_revenue: c.estimated_monthly_revenue,
            market_share: round_to(share_percent(c.estimated_monthly_revenue, total), 1),
        })
        .collect();

    Some(MarketShareEstimate {
        your_estimated_share: round_to(share_percent(caller_revenue, total), 1),
        top_3_competitors,
        concentration_ratio: round_to(cr3, 1),
        market_structure: classify(cr3),
    })
}

/// Maps a CR3 value to a market structure label.
#[must_use]
pub fn classify(cr3: f64) -> MarketStructure {
    if cr3 < MODERATE_CR3 {
        MarketStructure::Fragmented
    } else if cr3 < CONCENTRATED_CR3 {
        MarketStructure::Moderate
    } else {
        MarketStructure::Concentrated
    }
}

/// `revenue / total · 100`, or `0.0` when `total` is zero.
#[must_use]
pub fn share_percent(revenue: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let share = revenue as f64 / total as f64 * 100.0;
    share
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CompetitorBuilder, caller_profile};

    fn with_revenues(revenues: &[u64]) -> Vec<Competitor> {
        revenues
            .iter()
            .enumerate()
            .map(|(i, r)| CompetitorBuilder::new(&format!("c{i}")).revenue(*r).build())
            .collect()
    }

    #[test]
    fn empty_market_has_no_estimate() {
        assert!(estimate(Some(&caller_profile()), &[]).is_none());
    }

    #[test]
    fn three_competitors_without_caller() {
        let result = estimate(None, &with_revenues(&[100, 200, 300])).unwrap();
        let shares: Vec<f64> = result
            .top_3_competitors
            .iter()
            .map(|t| t.market_share)
            .collect();
        assert_eq!(shares, vec![50.0, 33.3, 16.7]);
        assert!((result.concentration_ratio - 100.0).abs() < f64::EPSILON);
        assert_eq!(result.market_structure, MarketStructure::Concentrated);
        assert!(result.your_estimated_share.abs() < f64::EPSILON);
    }

    #[test]
    fn top_three_are_descending_and_stable_on_ties() {
        let result = estimate(None, &with_revenues(&[50, 80, 80, 10, 80])).unwrap();
        let names: Vec<&str> = result
            .top_3_competitors
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["c1", "c2", "c4"]);
    }

    #[test]
    fn shares_sum_to_one_hundred_with_caller() {
        let mut caller = caller_profile();
        caller.estimated_monthly_revenue = 1_000;
        let competitors = with_revenues(&[400, 600, 1_000]);
        let result = estimate(Some(&caller), &competitors).unwrap();

        let total: f64 = result
            .top_3_competitors
            .iter()
            .map(|t| t.market_share)
            .sum::<f64>()
            + result.your_estimated_share;
        assert!((total - 100.0).abs() < 0.2, "shares summed to {total}");
        assert!((result.your_estimated_share - 33.3).abs() < 1e-9);
    }

    #[test]
    fn cr3_bounds_each_top_share() {
        let competitors = with_revenues(&[5, 90, 12, 33, 70, 1, 48, 48]);
        let result = estimate(Some(&caller_profile()), &competitors).unwrap();
        assert_eq!(result.top_3_competitors.len(), 3);
        for top in &result.top_3_competitors {
            assert!(result.concentration_ratio >= top.market_share);
        }
        assert!((0.0..=100.0).contains(&result.concentration_ratio));
    }

    #[test]
    fn zero_revenue_market_reports_zero_shares() {
        let result = estimate(None, &with_revenues(&[0, 0])).unwrap();
        assert!(result.concentration_ratio.abs() < f64::EPSILON);
        assert!(result
            .top_3_competitors
            .iter()
            .all(|t| t.market_share.abs() < f64::EPSILON));
        assert_eq!(result.market_structure, MarketStructure::Fragmented);
    }

    #[test]
    fn structure_thresholds() {
        assert_eq!(classify(0.0), MarketStructure::Fragmented);
        assert_eq!(classify(39.99), MarketStructure::Fragmented);
        assert_eq!(classify(40.0), MarketStructure::Moderate);
        assert_eq!(classify(69.99), MarketStructure::Moderate);
        assert_eq!(classify(70.0), MarketStructure::Concentrated);
        assert_eq!(classify(100.0), MarketStructure::Concentrated);
    }
}
