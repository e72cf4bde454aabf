#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Competitor source trait and the deterministic mock source.
//!
//! Every provider of competitor records implements [`CompetitorSource`].
//! [`mock::MockCompetitorSource`] synthesizes records from the embedded
//! [`catalog`]; [`UnavailableCompetitorSource`] stands in when mock data is
//! disabled and no live provider is configured.

pub mod cache;
pub mod catalog;
pub mod mock;

use async_trait::async_trait;
use compete_intel_competitor_models::{Competitor, Coordinates};

/// Default search radius in kilometres.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;
/// Default maximum number of results.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Errors that can occur while searching for competitors.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The city is not in the catalog.
    #[error("Unknown city: {name}")]
    UnknownCity {
        /// Requested city name.
        name: String,
    },

    /// The business category is not in the catalog.
    #[error("Unknown category: {name}")]
    UnknownCategory {
        /// Requested category name.
        name: String,
    },

    /// The source cannot serve requests.
    #[error("Competitor source unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },
}

/// Parameters of a competitor search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Business category name.
    pub category: String,
    /// City name.
    pub city: String,
    /// Reference point for distances; the city centre when absent.
    pub coordinates: Option<Coordinates>,
    /// Search radius in kilometres.
    pub radius_km: f64,
    /// Maximum number of competitors to return.
    pub max_results: usize,
    /// Only keep competitors whose neighborhood contains this text.
    pub neighborhood: Option<String>,
    /// Only keep competitors whose CEP shares its first five digits.
    pub cep: Option<String>,
}

impl SearchQuery {
    /// Creates a query with the default radius and result limit.
    #[must_use]
    pub fn new(category: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            city: city.into(),
            coordinates: None,
            radius_km: DEFAULT_RADIUS_KM,
            max_results: DEFAULT_MAX_RESULTS,
            neighborhood: None,
            cep: None,
        }
    }

    /// Sets the search radius.
    #[must_use]
    pub const fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    /// Sets the result limit.
    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Trait that all competitor providers implement.
#[async_trait]
pub trait CompetitorSource: Send + Sync {
    /// Returns a unique identifier for this source (e.g. `"mock"`).
    fn id(&self) -> &str;

    /// Whether results are synthetic.
    fn is_mock(&self) -> bool {
        false
    }

    /// Finds competitors matching `query`, nearest first.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the search cannot be served.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Competitor>, SourceError>;
}

/// Source used when mock data is disabled and no live provider exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableCompetitorSource;

#[async_trait]
impl CompetitorSource for UnavailableCompetitorSource {
    fn id(&self) -> &str {
        "unavailable"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Competitor>, SourceError> {
        log::warn!(
            "search: no live competitor source for {} in {}",
            query.category,
            query.city
        );
        Err(SourceError::Unavailable {
            message: "live competitor search is not configured; enable USE_MOCK_DATA".to_string(),
        })
    }
}
