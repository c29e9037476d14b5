//! # Remediation Service
//!
//! Tracker operations over a [`RemediationStore`].
//!
//! ## Completion cascade
//!
//! `complete_remediation` runs inside one store transaction:
//!
//! 1. load the tracker and apply the terminal completion;
//! 2. save it;
//! 3. if the parent finding is IN_PROGRESS, recount its open trackers inside
//!    the same transaction and resolve the finding when none remain.
//!
//! A failure at any step discards the whole transaction, so a tracker is
//! never left completed with its finding un-cascaded. Because the recount
//! happens under the transaction, two sibling completions racing each other
//! resolve the finding exactly once.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use grc_core::{Clock, FindingId, GrcError, TrackerId};
use grc_state::{
    CompletionDetails, Finding, FindingStatus, NewTracker, RemediationTracker, TrackerUpdate,
};
use grc_store::RemediationStore;

use crate::dashboard::{build_dashboard, completion_window_start, RemediationDashboard};
use crate::view::TrackerView;

/// Result of a completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionOutcome {
    #[serde(flatten)]
    pub tracker: TrackerView,
    /// Whether this completion resolved the parent finding.
    pub finding_resolved: bool,
}

pub struct RemediationService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: RemediationStore> RemediationService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn require_finding(&self, finding_id: FindingId) -> Result<Finding, GrcError> {
        self.store
            .find_finding(finding_id)?
            .ok_or_else(|| GrcError::not_found("finding", finding_id))
    }

    /// Open a tracker against an existing finding.
    pub fn create_tracker(
        &self,
        finding_id: FindingId,
        input: NewTracker,
    ) -> Result<TrackerView, GrcError> {
        let finding = self.require_finding(finding_id)?;
        let now = self.clock.now();
        let tracker = RemediationTracker::open(finding_id, input, now);
        self.store.save_tracker(&tracker)?;
        tracing::info!(
            tracker_id = %tracker.id,
            finding_id = %finding_id,
            sla_due_date = %tracker.sla_due_date,
            "remediation tracker created"
        );
        Ok(TrackerView::new(tracker, Some(&finding), now.date_naive()))
    }

    /// Apply a partial edit to an open tracker.
    pub fn update_tracker(
        &self,
        tracker_id: TrackerId,
        update: TrackerUpdate,
    ) -> Result<TrackerView, GrcError> {
        let now = self.clock.now();
        let (tracker, finding) = self.store.transaction(|tx| {
            let mut tracker = tx
                .find_tracker(tracker_id)?
                .ok_or_else(|| GrcError::not_found("tracker", tracker_id))?;
            tracker.apply_update(update, now)?;
            tx.save_tracker(&tracker)?;
            let finding = tx.find_finding(tracker.finding_id)?;
            Ok((tracker, finding))
        })?;
        tracing::debug!(
            tracker_id = %tracker_id,
            progress = tracker.progress_percent,
            "remediation tracker updated"
        );
        Ok(TrackerView::new(tracker, finding.as_ref(), now.date_naive()))
    }

    /// Complete a tracker and cascade to its finding.
    pub fn complete_remediation(
        &self,
        tracker_id: TrackerId,
        details: CompletionDetails,
    ) -> Result<CompletionOutcome, GrcError> {
        let now = self.clock.now();
        let (tracker, finding, finding_resolved) = self.store.transaction(|tx| {
            let mut tracker = tx
                .find_tracker(tracker_id)?
                .ok_or_else(|| GrcError::not_found("tracker", tracker_id))?;
            tracker.complete(details, now)?;
            tx.save_tracker(&tracker)?;

            let mut finding = tx.find_finding(tracker.finding_id)?;
            let mut resolved = false;
            if let Some(f) = finding.as_mut() {
                if f.status == FindingStatus::InProgress
                    && tx.count_open_trackers_for_finding(f.id)? == 0
                {
                    f.resolve(now)?;
                    tx.save_finding(f)?;
                    resolved = true;
                }
            }
            Ok((tracker, finding, resolved))
        })?;

        tracing::info!(
            tracker_id = %tracker_id,
            sla_met = tracker.sla_met,
            days_to_completion = tracker.days_to_completion.unwrap_or(0),
            "remediation completed"
        );
        if finding_resolved {
            tracing::info!(finding_id = %tracker.finding_id, "finding marked as resolved");
        }

        Ok(CompletionOutcome {
            tracker: TrackerView::new(tracker, finding.as_ref(), now.date_naive()),
            finding_resolved,
        })
    }

    /// Every tracker of a finding, open or completed.
    pub fn get_trackers_by_finding(
        &self,
        finding_id: FindingId,
    ) -> Result<Vec<TrackerView>, GrcError> {
        let finding = self.require_finding(finding_id)?;
        let today = self.clock.today();
        Ok(self
            .store
            .list_trackers_for_finding(finding_id)?
            .into_iter()
            .map(|t| TrackerView::new(t, Some(&finding), today))
            .collect())
    }

    /// SLA dashboard as of the clock's current day.
    pub fn dashboard(&self) -> Result<RemediationDashboard, GrcError> {
        let today = self.clock.today();
        let total_open_findings = self.store.count_findings_with_status(FindingStatus::Open)?;
        let open = self.store.list_open_trackers()?;
        let recently_completed = self
            .store
            .list_trackers_completed_after(completion_window_start(today))?;

        let mut finding_ids: Vec<FindingId> = open.iter().map(|t| t.finding_id).collect();
        finding_ids.sort();
        finding_ids.dedup();
        let findings: HashMap<FindingId, Finding> = self
            .store
            .list_findings_by_ids(&finding_ids)?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();

        let dashboard = build_dashboard(
            &open,
            &recently_completed,
            total_open_findings,
            &findings,
            today,
        );
        tracing::debug!(
            open_trackers = open.len(),
            on_track = dashboard.findings_on_track,
            at_risk = dashboard.findings_at_risk,
            overdue = dashboard.findings_overdue,
            "remediation dashboard built"
        );
        Ok(dashboard)
    }
}
