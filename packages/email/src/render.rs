//! Plain-text and HTML bodies of the analysis email.

use compete_intel_analytics_models::Priority;
use compete_intel_demo_models::AnalysisResults;

/// Competitors listed in the email.
pub const TOP_COMPETITORS: usize = 5;
/// Recommendations listed in the email.
pub const TOP_RECOMMENDATIONS: usize = 3;

/// Who the analysis was for and what it found.
#[derive(Debug, Clone, Copy)]
pub struct EmailContext<'a> {
    /// Requester's business name.
    pub business_name: &'a str,
    /// City analyzed.
    pub city: &'a str,
    /// State abbreviation, if known.
    pub state: Option<&'a str>,
    /// Category display name.
    pub category: &'a str,
    /// Stored analysis.
    pub results: &'a AnalysisResults,
}

impl EmailContext<'_> {
    fn location(&self) -> String {
        match self.state {
            Some(state) if !state.is_empty() => format!("{}/{state}", self.city),
            _ => self.city.to_string(),
        }
    }
}

/// Subject line.
#[must_use]
pub fn render_subject(ctx: &EmailContext<'_>) -> String {
    format!("Competitive Analysis - {} in {}", ctx.category, ctx.location())
}

/// Plain-text body.
#[must_use]
pub fn render_plaintext(ctx: &EmailContext<'_>) -> String {
    let density = &ctx.results.analytics.market_density;

    let mut lines = vec![
        "CompeteIntel - Competitive Analysis".to_string(),
        "===================================".to_string(),
        String::new(),
        format!("Hello, {}!", ctx.business_name),
        String::new(),
        format!(
            "Your competitive analysis for {} in {} is ready.",
            ctx.category,
            ctx.location()
        ),
        String::new(),
        "MARKET OVERVIEW".to_string(),
        "---------------".to_string(),
        format!("Total competitors: {}", density.total_competitors),
        format!("Density level: {}", density.density_level),
        format!(
            "Saturation score: {:.0}/100",
            density.market_saturation_score
        ),
        String::new(),
        format!("TOP {TOP_COMPETITORS} COMPETITORS"),
        "-----------------".to_string(),
    ];

    lines.extend(
        ctx.results
            .competitors
            .iter()
            .take(TOP_COMPETITORS)
            .enumerate()
            .map(|(i, competitor)| {
                format!(
                    "{}. {} - {:.1} stars ({} reviews)",
                    i + 1,
                    competitor.name,
                    competitor.rating,
                    competitor.review_count
                )
            }),
    );

    lines.push(String::new());
    lines.push("PRIORITY RECOMMENDATIONS".to_string());
    lines.push("------------------------".to_string());
    for rec in ctx
        .results
        .analytics
        .kpi_recommendations
        .iter()
        .take(TOP_RECOMMENDATIONS)
    {
        lines.push(String::new());
        lines.push(format!("* {} [{}]", rec.metric, rec.priority));
        lines.push(format!(
            "  Current: {} | Benchmark: {}",
            rec.current_value, rec.benchmark_value
        ));
        lines.push(format!("  Recommendation: {}", rec.recommendation));
    }

    lines.push(String::new());
    lines.push("---".to_string());
    lines.push("CompeteIntel".to_string());
    lines.push("Competitive intelligence for Brazilian businesses".to_string());

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

const fn priority_color(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "#dc2626",
        Priority::Medium => "#f59e0b",
        Priority::Low => "#10b981",
    }
}

/// Escapes text for inclusion in HTML element content or attributes.
#[must_use]
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// HTML body. Every interpolated value is escaped.
#[must_use]
pub fn render_html(ctx: &EmailContext<'_>) -> String {
    let density = &ctx.results.analytics.market_density;

    let rows: String = ctx
        .results
        .competitors
        .iter()
        .take(TOP_COMPETITORS)
        .enumerate()
        .map(|(i, competitor)| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.1}</td><td>{}</td></tr>",
                i + 1,
                escape_html(&competitor.name),
                competitor.rating,
                competitor.review_count
            )
        })
        .collect();

    let recommendations: String = ctx
        .results
        .analytics
        .kpi_recommendations
        .iter()
        .take(TOP_RECOMMENDATIONS)
        .map(|rec| {
            format!(
                "<div style=\"margin-bottom:20px;padding:15px;background:#f9fafb;\
                 border-left:4px solid {color};\">\
                 <h3>{metric}</h3>\
                 <p><strong>Current:</strong> {current} | <strong>Benchmark:</strong> {benchmark}</p>\
                 <p>{text}</p></div>",
                color = priority_color(rec.priority),
                metric = escape_html(&rec.metric),
                current = escape_html(&rec.current_value),
                benchmark = escape_html(&rec.benchmark_value),
                text = escape_html(&rec.recommendation),
            )
        })
        .collect();

    format!(
        "<!DOCTYPE html>\
         <html><head><meta charset=\"UTF-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\"></head>\
         <body style=\"font-family:Arial,sans-serif;background-color:#f3f4f6;\">\
         <div style=\"max-width:600px;margin:0 auto;padding:20px;\">\
         <h1>CompeteIntel</h1>\
         <p>Your competitive analysis is ready!</p>\
         <h2>Hello, {business}!</h2>\
         <p>We finished the competitive analysis for <strong>{category}</strong> in \
         <strong>{location}</strong>.</p>\
         <h3>Market overview</h3>\
         <table><tr><td>Total competitors</td><td>{total}</td></tr>\
         <tr><td>Density level</td><td>{level}</td></tr>\
         <tr><td>Saturation score</td><td>{score:.0}/100</td></tr></table>\
         <h3>Top {top_n} competitors</h3>\
         <table style=\"width:100%;border-collapse:collapse;\">\
         <thead><tr><th>#</th><th>Name</th><th>Rating</th><th>Reviews</th></tr></thead>\
         <tbody>{rows}</tbody></table>\
         <h3>Priority recommendations</h3>{recommendations}\
         <p style=\"color:#9ca3af;font-size:12px;\">This analysis was generated automatically \
         from public data.</p>\
         </div></body></html>",
        business = escape_html(ctx.business_name),
        category = escape_html(ctx.category),
        location = escape_html(&ctx.location()),
        total = density.total_competitors,
        level = density.density_level,
        score = density.market_saturation_score,
        top_n = TOP_COMPETITORS,
    )
}
