#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the CompeteIntel server.
//!
//! These types are serialized to JSON for the REST API. Request bodies
//! carry their own `validate` methods so handlers can reject bad input with
//! a 400 before touching any service.

use compete_intel_analytics_models::AnalyticsReport;
use compete_intel_competitor_models::{BusinessCategory, Competitor, Coordinates};
use serde::{Deserialize, Serialize};

/// Smallest accepted search radius in kilometres.
pub const MIN_RADIUS_KM: f64 = 0.5;
/// Largest accepted search radius in kilometres.
pub const MAX_RADIUS_KM: f64 = 50.0;
/// Largest accepted `max_results`.
pub const MAX_RESULTS_LIMIT: usize = 50;

/// A request body field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn check_len(
    field: &'static str,
    value: &str,
    min: usize,
    max: Option<usize>,
) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len < min {
        return Err(ValidationError::new(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    if let Some(max) = max.filter(|max| len > *max) {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

fn check_state(state: Option<&str>) -> Result<(), ValidationError> {
    match state {
        Some(s) if s.chars().count() != 2 => Err(ValidationError::new(
            "state",
            "must be a 2-letter abbreviation (e.g. SP, RJ)",
        )),
        _ => Ok(()),
    }
}

/// Digits of a CEP, accepting `XXXXX-XXX`, `12345678` and dotted forms.
///
/// Returns `None` for blank input.
///
/// # Errors
///
/// * If the CEP is not exactly 8 digits after removing `-`, `.` and spaces
pub fn normalize_cep(cep: &str) -> Result<Option<String>, ValidationError> {
    let cleaned: String = cep
        .chars()
        .filter(|c| !matches!(c, '-' | '.' | ' '))
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    if cleaned.len() != 8 || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(
            "cep",
            "must be 8 digits in format XXXXX-XXX or 12345678",
        ));
    }
    Ok(Some(cleaned))
}

/// Loose email shape check: `local@domain.tld` without whitespace.
#[must_use]
pub fn is_email_shaped(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .rsplit_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && tld.len() >= 2)
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

const fn default_radius_km() -> f64 {
    5.0
}

const fn default_max_results() -> usize {
    10
}

/// Body of `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The caller's business name. When present, a placeholder profile is
    /// used for caller-relative metrics.
    #[serde(default)]
    pub business_name: Option<String>,
    /// Business category.
    pub category: BusinessCategory,
    /// City name.
    pub city: String,
    /// Two-letter state abbreviation.
    #[serde(default)]
    pub state: Option<String>,
    /// Neighborhood filter.
    #[serde(default)]
    pub neighborhood: Option<String>,
    /// CEP filter.
    #[serde(default)]
    pub cep: Option<String>,
    /// Free-form address, informational only.
    #[serde(default)]
    pub address: Option<String>,
    /// Reference point, when known.
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Search radius in kilometres.
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    /// Maximum number of competitors to return.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl SearchRequest {
    /// Checks field constraints.
    ///
    /// # Errors
    ///
    /// * [`ValidationError`] naming the first offending field
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_len("city", &self.city, 2, None)?;
        check_state(self.state.as_deref())?;

        if !(MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(&self.radius_km) {
            return Err(ValidationError::new(
                "radius_km",
                format!("must be between {MIN_RADIUS_KM} and {MAX_RADIUS_KM}"),
            ));
        }
        if !(1..=MAX_RESULTS_LIMIT).contains(&self.max_results) {
            return Err(ValidationError::new(
                "max_results",
                format!("must be between 1 and {MAX_RESULTS_LIMIT}"),
            ));
        }
        if let Some(coordinates) = self.coordinates.filter(|c| !c.is_valid()) {
            return Err(ValidationError::new(
                "coordinates",
                format!(
                    "out of range: ({}, {})",
                    coordinates.latitude, coordinates.longitude
                ),
            ));
        }
        if let Some(cep) = &self.cep {
            normalize_cep(cep)?;
        }

        Ok(())
    }

    /// The CEP filter with blank input treated as absent.
    #[must_use]
    pub fn cep_filter(&self) -> Option<String> {
        self.cep
            .as_deref()
            .and_then(|cep| normalize_cep(cep).ok().flatten())
    }

    /// The business name, unless missing or blank.
    #[must_use]
    pub fn caller_name(&self) -> Option<&str> {
        self.business_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// Response of `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The request as received.
    pub query: SearchRequest,
    /// Competitors found, nearest first.
    pub competitors: Vec<Competitor>,
    /// Analytics over those competitors.
    pub analytics: AnalyticsReport,
    /// Number of competitors found.
    pub total_found: usize,
    /// Radius searched, in kilometres.
    pub search_radius_km: f64,
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Response of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootInfo {
    /// API title.
    pub name: String,
    /// API version.
    pub version: String,
    /// Always `"online"`.
    pub status: String,
    /// Deployment environment.
    pub environment: String,
    /// Whether competitor data is synthetic.
    pub using_mock_data: bool,
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `"healthy"`.
    pub status: String,
    /// API version.
    pub version: String,
    /// Deployment environment.
    pub environment: String,
    /// Whether competitor data is synthetic.
    pub using_mock_data: bool,
}

/// A supported business category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    /// Display name.
    pub name: String,
    /// CNAE activity code.
    pub cnae_code: String,
    /// CNAE activity description.
    pub description: String,
}

/// Response of `GET /api/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoriesResponse {
    /// Supported categories.
    pub categories: Vec<CategoryInfo>,
}

/// A supported city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityInfo {
    /// Display name.
    pub name: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// City centre.
    pub coordinates: Coordinates,
}

/// Response of `GET /api/cities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitiesResponse {
    /// Supported cities.
    pub cities: Vec<CityInfo>,
}

// ---------------------------------------------------------------------------
// Demo requests
// ---------------------------------------------------------------------------

/// Body of `POST /api/demo-request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoRequestCreate {
    /// Requester's business name.
    pub business_name: String,
    /// Where to send the analysis.
    pub email: String,
    /// City to analyze.
    pub city: String,
    /// Two-letter state abbreviation.
    #[serde(default)]
    pub state: Option<String>,
    /// Business category.
    pub category: BusinessCategory,
}

impl DemoRequestCreate {
    /// Checks field constraints.
    ///
    /// # Errors
    ///
    /// * [`ValidationError`] naming the first offending field
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_len("business_name", &self.business_name, 2, Some(200))?;
        if !is_email_shaped(&self.email) {
            return Err(ValidationError::new("email", "must be a valid email address"));
        }
        check_len("city", &self.city, 2, Some(100))?;
        check_state(self.state.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error.
    pub error: String,
}

impl ErrorBody {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
