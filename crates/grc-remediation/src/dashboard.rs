//! # Remediation Dashboard
//!
//! Buckets are computed over open trackers (no completion date):
//!
//! | Bucket     | Condition                                   |
//! |------------|---------------------------------------------|
//! | `on_track` | `days_until_due > 7` and progress < 100     |
//! | `at_risk`  | `0 < days_until_due <= 7`                   |
//! | `overdue`  | `days_until_due <= 0` and progress < 100    |
//!
//! An open tracker at 100% progress that is past due, or more than a week
//! out, lands in no bucket. It waits for an explicit completion.
//!
//! Completion metrics cover trackers completed strictly after
//! `today - 90 days`, whatever the state of their finding.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use grc_core::percent::{percentage, rounded_mean};
use grc_core::FindingId;
use grc_state::{Finding, RemediationPriority, RemediationTracker, AT_RISK_WINDOW_DAYS};

use crate::view::TrackerView;

/// Cap on `critical_findings`, `overdue_findings` and `upcoming_due`.
pub const LIST_LIMIT: usize = 10;

/// Upper bound (inclusive) of the upcoming-deadline window, in days.
pub const UPCOMING_WINDOW_DAYS: i64 = 14;

/// Trailing window for completion metrics, in days.
pub const COMPLETION_WINDOW_DAYS: i64 = 90;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationDashboard {
    /// Findings whose status is OPEN.
    pub total_open_findings: usize,
    pub findings_on_track: usize,
    pub findings_at_risk: usize,
    pub findings_overdue: usize,
    pub average_days_to_completion: i64,
    pub sla_compliance_rate: u32,
    pub critical_findings: Vec<TrackerView>,
    pub overdue_findings: Vec<TrackerView>,
    pub upcoming_due: Vec<TrackerView>,
}

/// Start of the completion window: trackers completed after this date count.
pub fn completion_window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(COMPLETION_WINDOW_DAYS)
}

fn is_on_track(t: &RemediationTracker, days: i64) -> bool {
    days > AT_RISK_WINDOW_DAYS && t.progress_percent < 100
}

fn is_at_risk(days: i64) -> bool {
    days > 0 && days <= AT_RISK_WINDOW_DAYS
}

fn is_overdue(t: &RemediationTracker, days: i64) -> bool {
    days <= 0 && t.progress_percent < 100
}

/// Assemble the dashboard from pre-loaded records.
///
/// `open` must be in query order; `critical_findings` and `overdue_findings`
/// keep that order.
pub fn build_dashboard(
    open: &[RemediationTracker],
    recently_completed: &[RemediationTracker],
    total_open_findings: usize,
    findings: &HashMap<FindingId, Finding>,
    today: NaiveDate,
) -> RemediationDashboard {
    let view = |t: &RemediationTracker| {
        TrackerView::new(t.clone(), findings.get(&t.finding_id), today)
    };
    let open: Vec<&RemediationTracker> = open.iter().filter(|t| t.is_open()).collect();

    let critical_findings = open
        .iter()
        .copied()
        .filter(|t| t.priority == RemediationPriority::Critical)
        .take(LIST_LIMIT)
        .map(view)
        .collect();

    let findings_on_track = open
        .iter()
        .filter(|t| is_on_track(t, t.days_until_due(today)))
        .count();
    let findings_at_risk = open
        .iter()
        .filter(|t| is_at_risk(t.days_until_due(today)))
        .count();
    let overdue: Vec<&RemediationTracker> = open
        .iter()
        .copied()
        .filter(|t| is_overdue(t, t.days_until_due(today)))
        .collect();

    let mut upcoming: Vec<&RemediationTracker> = open
        .iter()
        .copied()
        .filter(|t| {
            let d = t.days_until_due(today);
            d > 0 && d <= UPCOMING_WINDOW_DAYS
        })
        .collect();
    upcoming.sort_by_key(|t| t.sla_due_date);

    let average_days_to_completion = rounded_mean(
        recently_completed
            .iter()
            .map(|t| t.days_to_completion.unwrap_or(0) as f64),
    );
    let sla_met = recently_completed.iter().filter(|t| t.sla_met).count();

    RemediationDashboard {
        total_open_findings,
        findings_on_track,
        findings_at_risk,
        findings_overdue: overdue.len(),
        average_days_to_completion,
        sla_compliance_rate: percentage(sla_met, recently_completed.len()),
        critical_findings,
        overdue_findings: overdue.into_iter().take(LIST_LIMIT).map(view).collect(),
        upcoming_due: upcoming.into_iter().take(LIST_LIMIT).map(view).collect(),
    }
}
