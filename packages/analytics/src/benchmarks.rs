//! Market-wide averages and adoption rates computed over competitors.
//!
//! Benchmarks never include the caller's own business.

use compete_intel_competitor_models::Competitor;

/// Averages and feature-adoption percentages of a competitor set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompetitorBenchmarks {
    /// Mean rating.
    pub avg_rating: f64,
    /// Mean review count.
    pub avg_review_count: f64,
    /// Percentage of competitors with an Instagram profile.
    pub pct_with_instagram: f64,
    /// Percentage of competitors with a website.
    pub pct_with_website: f64,
    /// Percentage of competitors offering delivery.
    pub pct_with_delivery: f64,
    /// Percentage of competitors accepting PIX.
    pub pct_accepts_pix: f64,
}

impl CompetitorBenchmarks {
    /// Computes benchmarks, or `None` when there are no competitors.
    #[must_use]
    pub fn from_competitors(competitors: &[Competitor]) -> Option<Self> {
        if competitors.is_empty() {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let n = competitors.len() as f64;

        let avg_rating = competitors.iter().map(|c| c.rating).sum::<f64>() / n;
        let avg_review_count = competitors
            .iter()
            .map(|c| f64::from(c.review_count))
            .sum::<f64>()
            / n;

        let pct = |pred: fn(&Competitor) -> bool| {
            #[allow(clippy::cast_precision_loss)]
            let matching = competitors.iter().filter(|c| pred(c)).count() as f64;
            matching * 100.0 / n
        };

        Some(Self {
            avg_rating,
            avg_review_count,
            pct_with_instagram: pct(|c| c.online_presence.has_instagram),
            pct_with_website: pct(|c| c.online_presence.has_website),
            pct_with_delivery: pct(|c| c.has_delivery),
            pct_accepts_pix: pct(|c| c.accepts_pix),
        })
    }
}
