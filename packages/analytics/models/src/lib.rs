#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytics report types.
//!
//! Defines the input profile of the caller's own business and every
//! section of the [`AnalyticsReport`] produced by the analytics engine.
//! Field names are the JSON contract served by the REST API and stored
//! with demo requests, so they are kept `snake_case`.

use compete_intel_competitor_models::OnlinePresence;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The caller's own business, used for caller-relative metrics.
///
/// Absence of a profile is a valid state: positioning is skipped and the
/// caller's market share is reported as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallerBusinessProfile {
    /// Average review rating in `[0, 5]`.
    pub rating: f64,
    /// Number of reviews.
    pub review_count: u32,
    /// Online presence signals.
    pub online_presence: OnlinePresence,
    /// Estimated monthly revenue in BRL.
    pub estimated_monthly_revenue: u64,
    /// Whether the business offers delivery.
    pub has_delivery: bool,
    /// Whether the business accepts PIX instant payments.
    pub accepts_pix: bool,
}

/// Crowding tier derived from competitors per square kilometre.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DensityLevel {
    /// Fewer than 0.5 competitors/km².
    Low,
    /// 0.5 to 1.5 competitors/km².
    Medium,
    /// 1.5 to 3.0 competitors/km².
    High,
    /// 3.0 or more competitors/km².
    #[serde(rename = "Very High")]
    #[strum(serialize = "Very High")]
    VeryHigh,
}

/// Market density and saturation metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDensity {
    /// Number of competitors in the search area.
    pub total_competitors: usize,
    /// Competitors per km² of the search circle (2 decimals).
    pub competitors_per_km2: f64,
    /// Crowding tier.
    pub density_level: DensityLevel,
    /// Saturation index on a 0-100 scale (1 decimal).
    pub market_saturation_score: f64,
    /// Mean pairwise distance between competitors in km (2 decimals).
    pub avg_distance_between_competitors: f64,
}

/// Where the caller's business stands relative to competitors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Positioning {
    /// 1-based rank by rating among competitors plus the caller.
    pub your_ranking: usize,
    /// Number of ranked businesses, caller included.
    pub total_competitors: usize,
    /// Share of ranked businesses below the caller, 0-100 (1 decimal).
    pub percentile: f64,
    /// Whether the caller's rating beats the competitor mean.
    pub above_average_rating: bool,
    /// Whether the caller's review count beats the competitor mean.
    pub above_average_reviews: bool,
    /// Online presence score, 0-100 (1 decimal).
    pub online_presence_score: f64,
}

/// One of the three largest competitors by estimated revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCompetitorShare {
    /// Competitor name.
    pub name: String,
    /// Estimated monthly revenue in BRL.
    pub estimated_revenue: u64,
    /// Share of total market revenue, 0-100 (1 decimal).
    pub market_share: f64,
}

/// Market structure label derived from the CR3 concentration ratio.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum MarketStructure {
    /// CR3 below 40: no clear leaders.
    Fragmented,
    /// CR3 from 40 to 70.
    Moderate,
    /// CR3 of 70 or more: dominated by the top players.
    Concentrated,
}

/// Revenue-based market share estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketShareEstimate {
    /// Caller's share of total market revenue, 0-100 (1 decimal).
    pub your_estimated_share: f64,
    /// Up to three largest competitors, descending by revenue.
    pub top_3_competitors: Vec<TopCompetitorShare>,
    /// Combined share of the top three, 0-100 (1 decimal).
    pub concentration_ratio: f64,
    /// Structure label.
    pub market_structure: MarketStructure,
}

/// Priority of a recommendation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Priority {
    /// Act on this first.
    High,
    /// Worth doing soon.
    Medium,
    /// Nice to have.
    Low,
}

/// An actionable KPI recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// KPI name.
    pub metric: String,
    /// The caller's current value, human readable.
    pub current_value: String,
    /// The market benchmark, human readable.
    pub benchmark_value: String,
    /// What to do.
    pub recommendation: String,
    /// Priority.
    pub priority: Priority,
    /// Expected outcome.
    pub expected_impact: String,
}

/// Complete analytics output for one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Density and saturation.
    pub market_density: MarketDensity,
    /// Caller positioning, present only when a caller profile was given.
    pub competitive_positioning: Option<Positioning>,
    /// Market share estimate, absent when there are no competitors.
    pub market_share_estimate: Option<MarketShareEstimate>,
    /// Ordered recommendations.
    pub kpi_recommendations: Vec<Recommendation>,
    /// Natural-language summary.
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_level_serializes_with_space() {
        let json = serde_json::to_string(&DensityLevel::VeryHigh).unwrap();
        assert_eq!(json, "\"Very High\"");
        assert_eq!(DensityLevel::VeryHigh.to_string(), "Very High");
        assert_eq!("Very High".parse::<DensityLevel>().unwrap(), DensityLevel::VeryHigh);
    }

    #[test]
    fn priority_serializes_as_variant_name() {
        let json = serde_json::to_string(&Priority::Medium).unwrap();
        assert_eq!(json, "\"Medium\"");
    }

    #[test]
    fn absent_sections_serialize_as_null() {
        let report = AnalyticsReport {
            market_density: MarketDensity {
                total_competitors: 0,
                competitors_per_km2: 0.0,
                density_level: DensityLevel::Low,
                market_saturation_score: 0.0,
                avg_distance_between_competitors: 10.0,
            },
            competitive_positioning: None,
            market_share_estimate: None,
            kpi_recommendations: Vec::new(),
            summary: String::new(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert!(value["competitive_positioning"].is_null());
        assert!(value["market_share_estimate"].is_null());
        assert_eq!(value["market_density"]["density_level"], "Low");
    }
}
