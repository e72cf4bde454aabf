#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Demo request processing.
//!
//! A landing-page visitor submits their business and email; the request is
//! stored, analyzed against nearby competitors and the result is emailed.
//! Storage lives in [`db`]; [`process_demo_request`] drives the flow.

pub mod db;

use compete_intel_analytics_models::CallerBusinessProfile;
use compete_intel_competitor_models::OnlinePresence;
use compete_intel_demo_models::{
    AnalysisResults, DemoRequest, DemoRequestReceipt, DemoRequestStatus, NewDemoRequest,
};
use compete_intel_email::{EmailContext, EmailSender};
use compete_intel_source::{CompetitorSource, SearchQuery, SourceError};
use switchy_database::Database;

/// Search radius used for demo analyses, in kilometres.
pub const DEMO_RADIUS_KM: f64 = 5.0;
/// Competitors fetched for demo analyses.
pub const DEMO_MAX_RESULTS: usize = 10;

/// Errors that can occur while storing or processing demo requests.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// A database query or command failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed (e.g., creating the database file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Analysis results could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The competitor search failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// No request with this id exists.
    #[error("Demo request not found: {id}")]
    NotFound {
        /// Requested id.
        id: String,
    },

    /// The requested status change is not allowed.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: DemoRequestStatus,
        /// Requested status.
        to: DemoRequestStatus,
    },
}

/// Stand-in profile of the requester's business.
///
/// Demo requesters only give a name, so their own metrics are unknown; a
/// typical small business is assumed so the recommendations have
/// something to compare against.
#[must_use]
pub const fn demo_caller_profile() -> CallerBusinessProfile {
    CallerBusinessProfile {
        rating: 4.2,
        review_count: 50,
        online_presence: OnlinePresence {
            has_instagram: true,
            has_facebook: true,
            has_website: false,
            instagram_followers: 1000,
            facebook_likes: 500,
        },
        estimated_monthly_revenue: 35_000,
        has_delivery: true,
        accepts_pix: true,
    }
}

/// Message shown after a successful analysis.
#[must_use]
pub fn completed_message(found: usize, city: &str, email: &str) -> String {
    format!(
        "Analysis sent! We found {found} competitors in {city}. \
         Check your email {email} for the details."
    )
}

/// Message shown when the analysis failed. Never includes internal details.
pub const FAILED_MESSAGE: &str = "There was an error processing your request. \
     Please try again later or contact us.";

fn receipt(request: &DemoRequest, status: DemoRequestStatus, message: String) -> DemoRequestReceipt {
    DemoRequestReceipt {
        id: request.id.clone(),
        business_name: request.business_name.clone(),
        email: request.email.clone(),
        city: request.city.clone(),
        state: request.state.clone(),
        category: request.category.clone(),
        status,
        created_at: request.created_at.clone(),
        message,
    }
}

/// Stores, analyzes and emails one demo request.
///
/// Once the request is stored, failures of the analysis are recorded on the
/// request itself (status `failed`) and reported through the receipt rather
/// than as an error. Email delivery failures are only logged.
///
/// # Errors
///
/// Returns [`DemoError`] only if the request cannot be stored at all.
pub async fn process_demo_request(
    db: &dyn Database,
    source: &dyn CompetitorSource,
    sender: &dyn EmailSender,
    from_email: &str,
    input: &NewDemoRequest,
) -> Result<DemoRequestReceipt, DemoError> {
    let request = db::insert_pending(db, input).await?;
    log::info!(
        "process_demo_request: created {} for {}",
        request.id,
        request.email
    );

    let results = match analyze(db, source, &request).await {
        Ok(results) => results,
        Err(e) => {
            log::error!("process_demo_request: {} failed: {e}", request.id);
            if let Err(mark_err) = db::mark_failed(db, &request.id, &e.to_string()).await {
                log::error!(
                    "process_demo_request: could not mark {} failed: {mark_err}",
                    request.id
                );
            }
            return Ok(receipt(
                &request,
                DemoRequestStatus::Failed,
                FAILED_MESSAGE.to_string(),
            ));
        }
    };

    log::info!(
        "process_demo_request: {} completed with {} competitors",
        request.id,
        results.total_found
    );

    send_results(sender, from_email, &request, &results).await;

    Ok(receipt(
        &request,
        DemoRequestStatus::Completed,
        completed_message(results.total_found, &request.city, &request.email),
    ))
}

async fn analyze(
    db: &dyn Database,
    source: &dyn CompetitorSource,
    request: &DemoRequest,
) -> Result<AnalysisResults, DemoError> {
    db::update_status(db, &request.id, DemoRequestStatus::Processing).await?;

    let query = SearchQuery::new(request.category.as_str(), request.city.as_str())
        .with_radius_km(DEMO_RADIUS_KM)
        .with_max_results(DEMO_MAX_RESULTS);
    let competitors = source.search(&query).await?;

    let caller = demo_caller_profile();
    let analytics = compete_intel_analytics::run(&competitors, DEMO_RADIUS_KM, Some(&caller));

    let results = AnalysisResults {
        total_found: competitors.len(),
        competitors,
        analytics,
        search_radius_km: DEMO_RADIUS_KM,
    };

    db::store_results(db, &request.id, &results).await?;

    Ok(results)
}

async fn send_results(
    sender: &dyn EmailSender,
    from_email: &str,
    request: &DemoRequest,
    results: &AnalysisResults,
) {
    let ctx = EmailContext {
        business_name: &request.business_name,
        city: &request.city,
        state: request.state.as_deref(),
        category: &request.category,
        results,
    };

    let outcome = match compete_intel_email::compose(from_email, &request.email, &ctx) {
        Ok(email) => sender.send(&email).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => log::info!(
            "send_results: emailed {} via {}",
            request.email,
            sender.id()
        ),
        Err(e) => log::warn!(
            "send_results: email to {} failed, request {} stays completed: {e}",
            request.email,
            request.id
        ),
    }
}
