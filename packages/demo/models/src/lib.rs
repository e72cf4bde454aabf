#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for demo requests.
//!
//! A demo request is a landing-page signup that triggers one competitor
//! analysis for the requester's business. Its lifecycle is tracked by
//! [`DemoRequestStatus`].

use std::fmt;

use compete_intel_analytics_models::AnalyticsReport;
use compete_intel_competitor_models::{BusinessCategory, Competitor};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Processing state of a demo request.
///
/// `Pending → Processing → Completed | Failed`, and `Pending → Failed` when
/// processing cannot even start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoRequestStatus {
    /// Stored, not yet picked up.
    Pending,
    /// Analysis running.
    Processing,
    /// Analysis stored.
    Completed,
    /// Processing failed; see the error message.
    Failed,
}

impl DemoRequestStatus {
    /// Returns the `snake_case` string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether moving from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing | Self::Failed)
                | (Self::Processing, Self::Completed | Self::Failed)
        )
    }
}

impl fmt::Display for DemoRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DemoRequestStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("unknown DemoRequestStatus: {value}")),
        }
    }
}

impl std::str::FromStr for DemoRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Input of a new demo request, already validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDemoRequest {
    /// Requester's business name.
    pub business_name: String,
    /// Where to send the analysis.
    pub email: String,
    /// City to analyze.
    pub city: String,
    /// Two-letter state abbreviation.
    pub state: Option<String>,
    /// Business category.
    pub category: BusinessCategory,
}

/// Analysis stored with a completed demo request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    /// Competitors found, nearest first.
    pub competitors: Vec<Competitor>,
    /// Analytics over those competitors.
    pub analytics: AnalyticsReport,
    /// Number of competitors found.
    pub total_found: usize,
    /// Radius searched, in kilometres.
    pub search_radius_km: f64,
}

/// A stored demo request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoRequest {
    /// UUID v4.
    pub id: String,
    /// Requester's business name.
    pub business_name: String,
    /// Requester's email.
    pub email: String,
    /// City analyzed.
    pub city: String,
    /// State abbreviation, if given.
    pub state: Option<String>,
    /// Category display name.
    pub category: String,
    /// Current status.
    pub status: DemoRequestStatus,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// RFC 3339 time of the last status change.
    pub updated_at: String,
    /// Stored analysis once completed.
    pub analysis_results: Option<AnalysisResults>,
    /// Failure reason once failed.
    pub error_message: Option<String>,
}

/// Listing entry for a demo request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoRequestSummary {
    /// UUID v4.
    pub id: String,
    /// Requester's business name.
    pub business_name: String,
    /// Requester's email.
    pub email: String,
    /// City analyzed.
    pub city: String,
    /// Category display name.
    pub category: String,
    /// Current status.
    pub status: DemoRequestStatus,
    /// RFC 3339 creation time.
    pub created_at: String,
}

/// What the requester is told after submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoRequestReceipt {
    /// UUID v4.
    pub id: String,
    /// Requester's business name.
    pub business_name: String,
    /// Requester's email.
    pub email: String,
    /// City analyzed.
    pub city: String,
    /// State abbreviation, if given.
    pub state: Option<String>,
    /// Category display name.
    pub category: String,
    /// Final status of this submission.
    pub status: DemoRequestStatus,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// User-facing message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DemoRequestStatus; 4] = [
        DemoRequestStatus::Pending,
        DemoRequestStatus::Processing,
        DemoRequestStatus::Completed,
        DemoRequestStatus::Failed,
    ];

    #[test]
    fn status_string_roundtrip() {
        for status in ALL {
            let parsed: DemoRequestStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
            assert_eq!(
                serde_json::to_string(&status).unwrap(),
                format!("\"{status}\"")
            );
        }
        assert!("done".parse::<DemoRequestStatus>().is_err());
    }

    #[test]
    fn allowed_transitions() {
        use DemoRequestStatus::{Completed, Failed, Pending, Processing};

        let allowed = [
            (Pending, Processing),
            (Pending, Failed),
            (Processing, Completed),
            (Processing, Failed),
        ];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for status in ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(ALL.iter().all(|next| !status.can_transition_to(*next)));
        }
        assert!(!DemoRequestStatus::Pending.is_terminal());
        assert!(!DemoRequestStatus::Processing.is_terminal());
    }
}
