#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Competitive analytics engine.
//!
//! Turns a list of competitors, a search radius and an optional profile of
//! the caller's own business into an [`AnalyticsReport`]:
//!
//! 1. [`density`] measures crowding and saturation of the search circle.
//! 2. [`positioning`] ranks the caller by rating (only with a caller).
//! 3. [`market_share`] estimates revenue shares and CR3 concentration.
//! 4. [`recommendations`] runs the rule table over all of the above.
//!
//! Everything here is a pure function of its inputs.

pub mod benchmarks;
pub mod density;
pub mod geo;
pub mod market_share;
pub mod positioning;
pub mod recommendations;

use compete_intel_analytics_models::{
    AnalyticsReport, CallerBusinessProfile, MarketDensity, MarketShareEstimate, Positioning,
};
use compete_intel_competitor_models::Competitor;

/// Percentile from which the summary mentions the caller's top-X% standing.
const TOP_REMARK_PERCENTILE: f64 = 50.0;

/// Runs the full analytics pipeline.
#[must_use]
pub fn run(
    competitors: &[Competitor],
    radius_km: f64,
    caller: Option<&CallerBusinessProfile>,
) -> AnalyticsReport {
    let market_density = density::analyze(competitors, radius_km);
    let competitive_positioning = positioning::analyze(caller, competitors);
    let market_share_estimate = market_share::estimate(caller, competitors);
    let kpi_recommendations = recommendations::generate(
        caller,
        competitors,
        &market_density,
        competitive_positioning.as_ref(),
    );

    let summary = summarize(
        competitors.len(),
        radius_km,
        &market_density,
        market_share_estimate.as_ref(),
        competitive_positioning.as_ref(),
    );

    log::debug!(
        "run: competitors={} radius_km={radius_km} level={} recommendations={}",
        competitors.len(),
        market_density.density_level,
        kpi_recommendations.len()
    );

    AnalyticsReport {
        market_density,
        competitive_positioning,
        market_share_estimate,
        kpi_recommendations,
        summary,
    }
}

fn summarize(
    count: usize,
    radius_km: f64,
    density: &MarketDensity,
    share: Option<&MarketShareEstimate>,
    positioning: Option<&Positioning>,
) -> String {
    let mut parts = vec![
        format!("Found {count} competitors within a {radius_km:?}km radius."),
        format!(
            "Market density: {} ({:.1} competitors/km²).",
            density.density_level, density.competitors_per_km2
        ),
    ];

    if let Some(share) = share {
        parts.push(format!("Market structure: {}.", share.market_structure));
    }

    if let Some(positioning) = positioning.filter(|p| p.percentile >= TOP_REMARK_PERCENTILE) {
        parts.push(format!(
            "You are in the top {:.0}% by rating.",
            100.0 - positioning.percentile
        ));
    }

    parts.join(" ")
}

/// Rounds half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
