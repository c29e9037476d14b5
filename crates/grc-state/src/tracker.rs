//! # Remediation Tracker Lifecycle
//!
//! A tracker is the work item behind a finding's remediation. It is created
//! when a finding enters tracking, edited while work progresses, and
//! finalized by a single completion.
//!
//! ```text
//! Open (progress 0..=100, priority/notes editable) ──complete──▶ Completed (terminal)
//! ```
//!
//! ## Completion
//!
//! Completion stamps `completion_date = today`, forces `progress_percent`
//! to 100, computes `days_to_completion = ceil(today - created_at)` and
//! `sla_met = today <= sla_due_date`. Those fields are frozen afterwards:
//! every further edit or completion attempt is rejected, so `sla_met` is
//! never recomputed on a later read.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use grc_core::temporal::{ceil_days_between, days_until, utc_midnight};
use grc_core::{FindingId, GrcError, TrackerId};

use crate::status::RemediationStatus;

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Urgency of a remediation effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationPriority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by tracker edits and completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// The tracker has already been completed.
    #[error("tracker {tracker_id} is completed; completion fields are frozen")]
    TerminalState { tracker_id: TrackerId },

    /// Progress outside 0..=100.
    #[error("progress_percent {0} outside 0..=100")]
    ProgressOutOfRange(i64),
}

impl From<TrackerError> for GrcError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::TerminalState { .. } => GrcError::InvalidTransition(err.to_string()),
            TrackerError::ProgressOutOfRange(_) => GrcError::Validation(err.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Input for opening a tracker against a finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTracker {
    #[serde(default)]
    pub priority: Option<RemediationPriority>,
    pub sla_due_date: NaiveDate,
    #[serde(default)]
    pub remediation_steps: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Partial edit of an open tracker. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerUpdate {
    #[serde(default)]
    pub priority: Option<RemediationPriority>,
    /// Signed and wide; [`RemediationTracker::apply_update`] enforces 0..=100.
    #[serde(default)]
    pub progress_percent: Option<i64>,
    #[serde(default)]
    pub progress_notes: Option<String>,
    #[serde(default)]
    pub remediation_steps: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Free-form details recorded with the completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionDetails {
    #[serde(default)]
    pub completion_notes: Option<String>,
    #[serde(default)]
    pub completion_evidence: Option<String>,
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Remediation work item tied to a finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationTracker {
    pub id: TrackerId,
    pub finding_id: FindingId,
    pub priority: RemediationPriority,
    pub sla_due_date: NaiveDate,
    pub progress_percent: u8,
    #[serde(default)]
    pub progress_notes: Option<String>,
    #[serde(default)]
    pub remediation_steps: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub completion_date: Option<NaiveDate>,
    #[serde(default)]
    pub completion_notes: Option<String>,
    #[serde(default)]
    pub completion_evidence: Option<String>,
    #[serde(default)]
    pub sla_met: bool,
    #[serde(default)]
    pub days_to_completion: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RemediationTracker {
    /// Open a new tracker against `finding_id`. Priority defaults to medium.
    pub fn open(finding_id: FindingId, input: NewTracker, now: DateTime<Utc>) -> Self {
        Self {
            id: TrackerId::new(),
            finding_id,
            priority: input.priority.unwrap_or_default(),
            sla_due_date: input.sla_due_date,
            progress_percent: 0,
            progress_notes: None,
            remediation_steps: input.remediation_steps,
            assigned_to: input.assigned_to,
            completion_date: None,
            completion_notes: None,
            completion_evidence: None,
            sla_met: false,
            days_to_completion: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the tracker still awaits completion.
    pub fn is_open(&self) -> bool {
        self.completion_date.is_none()
    }

    /// Whole days from `today` until the SLA due date.
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        days_until(self.sla_due_date, today)
    }

    /// Derived status as of `today`.
    pub fn status(&self, today: NaiveDate) -> RemediationStatus {
        RemediationStatus::derive(self.completion_date, self.sla_due_date, today)
    }

    /// Apply a partial edit. Rejected once the tracker is completed.
    pub fn apply_update(
        &mut self,
        update: TrackerUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), TrackerError> {
        self.require_open()?;
        if let Some(p) = update.progress_percent {
            self.progress_percent = match u8::try_from(p) {
                Ok(pct) if pct <= 100 => pct,
                _ => return Err(TrackerError::ProgressOutOfRange(p)),
            };
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if update.progress_notes.is_some() {
            self.progress_notes = update.progress_notes;
        }
        if update.remediation_steps.is_some() {
            self.remediation_steps = update.remediation_steps;
        }
        if update.assigned_to.is_some() {
            self.assigned_to = update.assigned_to;
        }
        self.updated_at = now;
        Ok(())
    }

    /// The single terminal transition.
    pub fn complete(
        &mut self,
        details: CompletionDetails,
        now: DateTime<Utc>,
    ) -> Result<(), TrackerError> {
        self.require_open()?;
        let today = now.date_naive();
        self.completion_date = Some(today);
        self.completion_notes = details.completion_notes;
        self.completion_evidence = details.completion_evidence;
        self.progress_percent = 100;
        self.days_to_completion = Some(ceil_days_between(self.created_at, utc_midnight(today)));
        self.sla_met = today <= self.sla_due_date;
        self.updated_at = now;
        Ok(())
    }

    fn require_open(&self) -> Result<(), TrackerError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(TrackerError::TerminalState {
                tracker_id: self.id,
            })
        }
    }
}
