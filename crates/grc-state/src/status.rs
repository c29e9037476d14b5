//! # Derived Remediation Status
//!
//! The status of a tracker is never stored. It is recomputed on every read
//! from the completion date and the distance to the SLA due date:
//!
//! | Condition                         | Status      |
//! |-----------------------------------|-------------|
//! | `completion_date` set             | `completed` |
//! | `days_until_due <= 0`             | `overdue`   |
//! | `0 < days_until_due <= 7`         | `at_risk`   |
//! | `days_until_due > 7`              | `on_track`  |
//!
//! `overdue` does not look at progress: a past-due tracker at 100% with no
//! completion date still reads as overdue here. The dashboard buckets apply
//! their own progress filter on top.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use grc_core::temporal::days_until;

/// Upper bound (inclusive) of the at-risk window, in days.
pub const AT_RISK_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationStatus {
    OnTrack,
    AtRisk,
    Overdue,
    Completed,
}

impl RemediationStatus {
    /// Classify a tracker from its completion date and SLA due date.
    pub fn derive(
        completion_date: Option<NaiveDate>,
        sla_due_date: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        if completion_date.is_some() {
            return Self::Completed;
        }
        Self::from_days_until_due(days_until(sla_due_date, today))
    }

    /// Classify an open tracker from its distance to the due date.
    pub fn from_days_until_due(days_until_due: i64) -> Self {
        if days_until_due <= 0 {
            Self::Overdue
        } else if days_until_due <= AT_RISK_WINDOW_DAYS {
            Self::AtRisk
        } else {
            Self::OnTrack
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnTrack => "on_track",
            Self::AtRisk => "at_risk",
            Self::Overdue => "overdue",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for RemediationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
