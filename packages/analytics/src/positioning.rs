//! Caller positioning against competitors.
//!
//! The caller is ranked by rating among competitors plus itself. When the
//! caller's rating equals one or more competitor ratings, the caller is
//! placed after all of them.

use compete_intel_analytics_models::{CallerBusinessProfile, Positioning};
use compete_intel_competitor_models::{Competitor, OnlinePresence};

use crate::benchmarks::CompetitorBenchmarks;
use crate::round_to;

/// Rating mean assumed when there are no competitors to compare against.
pub const BASELINE_RATING: f64 = 4.0;
/// Review-count mean assumed when there are no competitors to compare against.
pub const BASELINE_REVIEW_COUNT: f64 = 100.0;

const WEBSITE_POINTS: f64 = 40.0;
const INSTAGRAM_POINTS: f64 = 30.0;
const INSTAGRAM_FOLLOWER_BONUS_CAP: f64 = 20.0;
const FOLLOWERS_PER_BONUS_POINT: f64 = 1_000.0;
const FACEBOOK_POINTS: f64 = 10.0;

/// Positions `caller` among `competitors`, or `None` without a caller.
#[must_use]
pub fn analyze(
    caller: Option<&CallerBusinessProfile>,
    competitors: &[Competitor],
) -> Option<Positioning> {
    let caller = caller?;

    let total = competitors.len() + 1;
    let rank = 1 + competitors
        .iter()
        .filter(|c| c.rating >= caller.rating)
        .count();

    #[allow(clippy::cast_precision_loss)]
    let percentile = (total - rank) as f64 / total as f64 * 100.0;

    let (avg_rating, avg_reviews) = CompetitorBenchmarks::from_competitors(competitors)
        .map_or((BASELINE_RATING, BASELINE_REVIEW_COUNT), |b| {
            (b.avg_rating, b.avg_review_count)
        });

    Some(Positioning {
        your_ranking: rank,
        total_competitors: total,
        percentile: round_to(percentile, 1),
        above_average_rating: caller.rating > avg_rating,
        above_average_reviews: f64::from(caller.review_count) > avg_reviews,
        online_presence_score: round_to(online_presence_score(&caller.online_presence), 1),
    })
}

/// Scores online presence on a 0-100 scale.
///
/// Website 40, Instagram 30 plus one point per thousand followers (up to
/// 20), Facebook 10.
#[must_use]
pub fn online_presence_score(presence: &OnlinePresence) -> f64 {
    let mut score = 0.0;
    if presence.has_website {
        score += WEBSITE_POINTS;
    }
    if presence.has_instagram {
        let bonus = f64::from(presence.instagram_followers) / FOLLOWERS_PER_BONUS_POINT;
        score += INSTAGRAM_POINTS + bonus.min(INSTAGRAM_FOLLOWER_BONUS_CAP);
    }
    if presence.has_facebook {
        score += FACEBOOK_POINTS;
    }
    score.clamp(0.0, 100.0)
}
