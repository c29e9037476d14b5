//! # Finding Lifecycle
//!
//! Findings are owned by the findings service; the posture engine reads
//! them and performs exactly one transition itself: resolving a finding
//! whose remediation trackers have all completed.
//!
//! ```text
//! Open ──▶ InProgress ──▶ Resolved ──▶ Closed
//!   │          │
//!   └──────────┴──▶ RiskAccepted / FalsePositive
//! ```
//!
//! Resolution is guarded on the current status being `InProgress`. An
//! `Open` finding stays open even when every one of its trackers has
//! completed; the cascade leaves it for a human to pick up.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use grc_core::{FindingId, GrcError};

/// Severity assigned to a finding at discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSeverity {
    Critical,
    High,
    Medium,
    Low,
    Informational,
}

/// Workflow status of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    RiskAccepted,
    FalsePositive,
}

impl std::fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
            Self::RiskAccepted => "RISK_ACCEPTED",
            Self::FalsePositive => "FALSE_POSITIVE",
        };
        f.write_str(s)
    }
}

/// Errors raised by finding transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FindingError {
    #[error("invalid finding transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl From<FindingError> for GrcError {
    fn from(err: FindingError) -> Self {
        GrcError::InvalidTransition(err.to_string())
    }
}

/// An audit or assessment finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub id: FindingId,
    /// Human-facing key, e.g. "FND-2026-014".
    pub finding_identifier: String,
    pub title: String,
    pub severity: FindingSeverity,
    pub status: FindingStatus,
    #[serde(default)]
    pub remediation_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub remediation_completed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Finding {
    /// Resolve a finding whose remediation is complete (IN_PROGRESS → RESOLVED).
    pub fn resolve(&mut self, now: DateTime<Utc>) -> Result<(), FindingError> {
        if self.status != FindingStatus::InProgress {
            return Err(FindingError::InvalidTransition {
                from: self.status.to_string(),
                to: FindingStatus::Resolved.to_string(),
            });
        }
        self.status = FindingStatus::Resolved;
        self.remediation_completed_date = Some(now);
        self.updated_at = now;
        Ok(())
    }
}
