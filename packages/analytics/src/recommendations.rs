//! Rule-based KPI recommendations.
//!
//! Rules live in the ordered [`RULES`] table. Each rule inspects a
//! [`RuleContext`] and either emits one [`Recommendation`] or nothing. The
//! table order is the presentation order. When no rule emits anything a
//! single "maintain leadership" recommendation is returned instead.

use compete_intel_analytics_models::{
    CallerBusinessProfile, MarketDensity, Positioning, Priority, Recommendation,
};
use compete_intel_competitor_models::Competitor;

use crate::benchmarks::CompetitorBenchmarks;

/// Saturation score above which the market-saturation warning fires.
pub const SATURATION_WARNING_SCORE: f64 = 70.0;
/// Instagram adoption among competitors above which a missing profile is flagged.
pub const INSTAGRAM_ADOPTION_PCT: f64 = 50.0;
/// Delivery adoption among competitors above which missing delivery is flagged.
pub const DELIVERY_ADOPTION_PCT: f64 = 60.0;
/// PIX adoption among competitors above which missing PIX is flagged.
pub const PIX_ADOPTION_PCT: f64 = 70.0;

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The caller's business, if known.
    pub caller: Option<&'a CallerBusinessProfile>,
    /// Competitors in the search area.
    pub competitors: &'a [Competitor],
    /// Competitor averages, absent when there are no competitors.
    pub benchmarks: Option<CompetitorBenchmarks>,
    /// Density analysis of the search area.
    pub density: &'a MarketDensity,
}

impl<'a> RuleContext<'a> {
    /// Builds a context, computing competitor benchmarks once.
    #[must_use]
    pub fn new(
        caller: Option<&'a CallerBusinessProfile>,
        competitors: &'a [Competitor],
        density: &'a MarketDensity,
    ) -> Self {
        Self {
            caller,
            competitors,
            benchmarks: CompetitorBenchmarks::from_competitors(competitors),
            density,
        }
    }

    /// Caller and benchmarks together, for rules that compare the two.
    fn caller_vs_market(&self) -> Option<(&'a CallerBusinessProfile, CompetitorBenchmarks)> {
        Some((self.caller?, self.benchmarks?))
    }
}

/// One named entry in the rule table.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationRule {
    /// Identifier used in logs and tests.
    pub name: &'static str,
    /// Emits a recommendation when the rule's condition holds.
    pub evaluate: fn(&RuleContext<'_>) -> Option<Recommendation>,
}

/// All rules, in presentation order.
pub const RULES: &[RecommendationRule] = &[
    RecommendationRule {
        name: "rating",
        evaluate: rating_rule,
    },
    RecommendationRule {
        name: "review_count",
        evaluate: review_count_rule,
    },
    RecommendationRule {
        name: "instagram",
        evaluate: instagram_rule,
    },
    RecommendationRule {
        name: "saturation",
        evaluate: saturation_rule,
    },
    RecommendationRule {
        name: "delivery",
        evaluate: delivery_rule,
    },
    RecommendationRule {
        name: "pix",
        evaluate: pix_rule,
    },
];

/// Evaluates every rule in order, falling back to
/// [`maintain_leadership`] when none fires.
///
/// No rule reads `_positioning`; every comparison is made against the raw
/// competitor benchmarks.
#[must_use]
pub fn generate(
    caller: Option<&CallerBusinessProfile>,
    competitors: &[Competitor],
    density: &MarketDensity,
    _positioning: Option<&Positioning>,
) -> Vec<Recommendation> {
    let ctx = RuleContext::new(caller, competitors, density);

    let mut recommendations: Vec<Recommendation> = RULES
        .iter()
        .filter_map(|rule| {
            let rec = (rule.evaluate)(&ctx);
            if rec.is_some() {
                log::debug!("generate: rule '{}' fired", rule.name);
            }
            rec
        })
        .collect();

    if recommendations.is_empty() {
        recommendations.push(maintain_leadership());
    }

    recommendations
}

fn rating_rule(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let (caller, market) = ctx.caller_vs_market()?;
    (caller.rating < market.avg_rating).then(|| Recommendation {
        metric: "Google Rating".to_string(),
        current_value: format!("{:.1} stars", caller.rating),
        benchmark_value: format!("{:.1} stars (average)", market.avg_rating),
        recommendation: "Focus on improving the customer experience and encourage positive \
                         reviews. Consider a loyalty program."
            .to_string(),
        priority: Priority::High,
        expected_impact: "30-50% increase in new visits".to_string(),
    })
}

fn review_count_rule(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let (caller, market) = ctx.caller_vs_market()?;
    (f64::from(caller.review_count) < market.avg_review_count).then(|| Recommendation {
        metric: "Review Count".to_string(),
        current_value: format!("{} reviews", caller.review_count),
        benchmark_value: format!("{:.0} reviews (average)", market.avg_review_count.trunc()),
        recommendation: "Ask for feedback actively. Use QR codes, incentives and post-sale \
                         follow-up."
            .to_string(),
        priority: Priority::Medium,
        expected_impact: "Greater credibility and online visibility".to_string(),
    })
}

fn instagram_rule(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let (caller, market) = ctx.caller_vs_market()?;
    (!caller.online_presence.has_instagram && market.pct_with_instagram > INSTAGRAM_ADOPTION_PCT)
        .then(|| Recommendation {
            metric: "Instagram Presence".to_string(),
            current_value: "Not active".to_string(),
            benchmark_value: format!("{:.0}% of competitors have it", market.pct_with_instagram),
            recommendation: "Create an Instagram profile and post regularly (3-5 times a week) \
                             with attractive visual content."
                .to_string(),
            priority: Priority::High,
            expected_impact: "Reach the 58% of Brazilians active on the platform".to_string(),
        })
}

fn saturation_rule(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let score = ctx.density.market_saturation_score;
    (score > SATURATION_WARNING_SCORE).then(|| Recommendation {
        metric: "Market Saturation".to_string(),
        current_value: format!("{score:.0}/100"),
        benchmark_value: "<50 ideal".to_string(),
        recommendation: "The market is highly saturated. Differentiate through a specific \
                         niche, a unique product or excellent service."
            .to_string(),
        priority: Priority::High,
        expected_impact: "Differentiation is critical for survival".to_string(),
    })
}

fn delivery_rule(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let (caller, market) = ctx.caller_vs_market()?;
    (market.pct_with_delivery > DELIVERY_ADOPTION_PCT && !caller.has_delivery).then(|| {
        Recommendation {
            metric: "Delivery".to_string(),
            current_value: "Not offered".to_string(),
            benchmark_value: format!("{:.0}% of competitors offer it", market.pct_with_delivery),
            recommendation: "Offer delivery through iFood, Rappi or your own service.".to_string(),
            priority: Priority::High,
            expected_impact: "40-60% growth in the customer base".to_string(),
        }
    })
}

fn pix_rule(ctx: &RuleContext<'_>) -> Option<Recommendation> {
    let (caller, market) = ctx.caller_vs_market()?;
    (market.pct_accepts_pix > PIX_ADOPTION_PCT && !caller.accepts_pix).then(|| Recommendation {
        metric: "PIX Payments".to_string(),
        current_value: "Not accepted".to_string(),
        benchmark_value: format!("{:.0}% of competitors accept it", market.pct_accepts_pix),
        recommendation: "Start accepting PIX right away. It is the preferred payment method of \
                         most Brazilian consumers."
            .to_string(),
        priority: Priority::High,
        expected_impact: "Fewer lost sales from missing payment options".to_string(),
    })
}

/// The generic recommendation emitted when no rule fires.
#[must_use]
pub fn maintain_leadership() -> Recommendation {
    Recommendation {
        metric: "Maintain Leadership".to_string(),
        current_value: "Above average".to_string(),
        benchmark_value: "Keep it up".to_string(),
        recommendation: "Keep your high standards and monitor the competition regularly."
            .to_string(),
        priority: Priority::Medium,
        expected_impact: "Long-term sustainability".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density;
    use crate::test_support::{CompetitorBuilder, caller_profile};
    use compete_intel_analytics_models::DensityLevel;
    use compete_intel_competitor_models::OnlinePresence;

    fn quiet_density() -> MarketDensity {
        density::analyze(&[], 5.0)
    }

    fn saturated_density() -> MarketDensity {
        MarketDensity {
            total_competitors: 100,
            competitors_per_km2: 6.0,
            density_level: DensityLevel::VeryHigh,
            market_saturation_score: 95.0,
            avg_distance_between_competitors: 0.3,
        }
    }

    /// A caller that matches or beats `market` on every rule.
    fn strong_caller() -> CallerBusinessProfile {
        let mut caller = caller_profile();
        caller.rating = 5.0;
        caller.review_count = 10_000;
        caller.online_presence = OnlinePresence {
            has_instagram: true,
            has_facebook: true,
            has_website: true,
            instagram_followers: 5_000,
            facebook_likes: 100,
        };
        caller.has_delivery = true;
        caller.accepts_pix = true;
        caller
    }

    fn market() -> Vec<Competitor> {
        (0..4)
            .map(|i| {
                CompetitorBuilder::new(&format!("c{i}"))
                    .rating(4.5)
                    .reviews(200)
                    .instagram(true)
                    .delivery(true)
                    .pix(true)
                    .build()
            })
            .collect()
    }

    fn metrics(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.metric.as_str()).collect()
    }

    #[test]
    fn rule_table_order_is_fixed() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec!["rating", "review_count", "instagram", "saturation", "delivery", "pix"]
        );
    }

    #[test]
    fn weak_caller_triggers_every_caller_rule_in_order() {
        let mut caller = caller_profile();
        caller.rating = 3.0;
        caller.review_count = 10;
        caller.online_presence = OnlinePresence::default();
        caller.has_delivery = false;
        caller.accepts_pix = false;

        let recs = generate(Some(&caller), &market(), &saturated_density(), None);
        assert_eq!(
            metrics(&recs),
            vec![
                "Google Rating",
                "Review Count",
                "Instagram Presence",
                "Market Saturation",
                "Delivery",
                "PIX Payments",
            ]
        );
        assert_eq!(recs[1].priority, Priority::Medium);
        assert!(
            recs.iter()
                .filter(|r| r.metric != "Review Count")
                .all(|r| r.priority == Priority::High)
        );
    }

    #[test]
    fn rating_rule_formats_values() {
        let mut caller = strong_caller();
        caller.rating = 4.0;
        let competitors = market();
        let density = quiet_density();
        let ctx = RuleContext::new(Some(&caller), &competitors, &density);

        let rec = rating_rule(&ctx).unwrap();
        assert_eq!(rec.current_value, "4.0 stars");
        assert_eq!(rec.benchmark_value, "4.5 stars (average)");
        assert_eq!(rec.priority, Priority::High);
    }

    #[test]
    fn review_rule_truncates_average() {
        let mut caller = strong_caller();
        caller.review_count = 5;
        let competitors = vec![
            CompetitorBuilder::new("a").reviews(10).build(),
            CompetitorBuilder::new("b").reviews(11).build(),
        ];
        let density = quiet_density();
        let ctx = RuleContext::new(Some(&caller), &competitors, &density);

        let rec = review_count_rule(&ctx).unwrap();
        assert_eq!(rec.current_value, "5 reviews");
        assert_eq!(rec.benchmark_value, "10 reviews (average)");
    }

    #[test]
    fn instagram_rule_needs_majority_adoption() {
        let mut caller = strong_caller();
        caller.online_presence.has_instagram = false;
        let density = quiet_density();

        let half = vec![
            CompetitorBuilder::new("a").instagram(true).build(),
            CompetitorBuilder::new("b").build(),
        ];
        let ctx = RuleContext::new(Some(&caller), &half, &density);
        assert!(instagram_rule(&ctx).is_none());

        let most = vec![
            CompetitorBuilder::new("a").instagram(true).build(),
            CompetitorBuilder::new("b").instagram(true).build(),
            CompetitorBuilder::new("c").build(),
        ];
        let ctx = RuleContext::new(Some(&caller), &most, &density);
        let rec = instagram_rule(&ctx).unwrap();
        assert_eq!(rec.benchmark_value, "67% of competitors have it");
    }

    #[test]
    fn saturation_rule_is_caller_independent() {
        let recs = generate(None, &[], &saturated_density(), None);
        assert_eq!(metrics(&recs), vec!["Market Saturation"]);
        assert_eq!(recs[0].current_value, "95/100");
    }

    #[test]
    fn saturation_rule_threshold_is_strict() {
        let mut density = saturated_density();
        density.market_saturation_score = 70.0;
        let ctx = RuleContext::new(None, &[], &density);
        assert!(saturation_rule(&ctx).is_none());
    }

    #[test]
    fn delivery_rule_needs_more_than_sixty_percent() {
        let mut caller = strong_caller();
        caller.has_delivery = false;
        let density = quiet_density();

        // 3 of 5 is exactly 60%
        let competitors: Vec<_> = (0..5)
            .map(|i| CompetitorBuilder::new(&format!("c{i}")).delivery(i < 3).build())
            .collect();
        let ctx = RuleContext::new(Some(&caller), &competitors, &density);
        assert!(delivery_rule(&ctx).is_none());

        let competitors: Vec<_> = (0..5)
            .map(|i| CompetitorBuilder::new(&format!("c{i}")).delivery(i < 4).build())
            .collect();
        let ctx = RuleContext::new(Some(&caller), &competitors, &density);
        assert_eq!(
            delivery_rule(&ctx).unwrap().benchmark_value,
            "80% of competitors offer it"
        );
    }

    #[test]
    fn pix_rule_needs_more_than_seventy_percent() {
        let mut caller = strong_caller();
        caller.accepts_pix = false;
        let density = quiet_density();

        let competitors: Vec<_> = (0..10)
            .map(|i| CompetitorBuilder::new(&format!("c{i}")).pix(i < 7).build())
            .collect();
        let ctx = RuleContext::new(Some(&caller), &competitors, &density);
        assert!(pix_rule(&ctx).is_none());

        let competitors: Vec<_> = (0..10)
            .map(|i| CompetitorBuilder::new(&format!("c{i}")).pix(i < 8).build())
            .collect();
        let ctx = RuleContext::new(Some(&caller), &competitors, &density);
        assert!(pix_rule(&ctx).is_some());
    }

    #[test]
    fn caller_rules_do_not_fire_without_caller() {
        let density = quiet_density();
        let competitors = market();
        let ctx = RuleContext::new(None, &competitors, &density);
        for rule in RULES {
            assert!(
                (rule.evaluate)(&ctx).is_none(),
                "rule '{}' fired without a caller on a quiet market",
                rule.name
            );
        }
    }

    #[test]
    fn fallback_fires_iff_no_rule_fires() {
        let density = quiet_density();
        let strong = strong_caller();
        let mut weak = caller_profile();
        weak.rating = 1.0;
        let market = market();
        let empty: &[Competitor] = &[];

        let cases: [(Option<&CallerBusinessProfile>, &[Competitor]); 5] = [
            (None, market.as_slice()),
            (None, empty),
            (Some(&strong), market.as_slice()),
            (Some(&strong), empty),
            (Some(&weak), market.as_slice()),
        ];

        for (caller, competitors) in cases {
            let ctx = RuleContext::new(caller, competitors, &density);
            let any_fired = RULES.iter().any(|r| (r.evaluate)(&ctx).is_some());
            let recs = generate(caller, competitors, &density, None);
            let has_fallback = recs.iter().any(|r| r.metric == "Maintain Leadership");

            assert_eq!(has_fallback, !any_fired);
            if has_fallback {
                assert_eq!(recs.len(), 1);
                assert_eq!(recs[0].priority, Priority::Medium);
            }
        }
    }

    #[test]
    fn empty_market_with_caller_falls_back() {
        let recs = generate(Some(&caller_profile()), &[], &quiet_density(), None);
        assert_eq!(recs, vec![maintain_leadership()]);
    }

    #[test]
    fn positioning_does_not_change_recommendations() {
        let mut caller = caller_profile();
        caller.rating = 3.0;
        let positioning = crate::positioning::analyze(Some(&caller), &market()).unwrap();

        assert_eq!(
            generate(Some(&caller), &market(), &saturated_density(), Some(&positioning)),
            generate(Some(&caller), &market(), &saturated_density(), None)
        );
    }
}
