//! # Collaborator Ports
//!
//! Simple record interfaces the engines consume. Storage format is the
//! adapter's business; the engines only see these traits.
//!
//! ## Transactions
//!
//! [`RemediationStore::transaction`] runs a closure against a
//! [`RemediationTx`] view. Implementations must guarantee that either every
//! write staged through the view is applied or none is, and that two
//! transactions never interleave. The completion cascade relies on this to
//! re-check "zero open trackers" without racing a sibling completion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use grc_core::{
    Assessment, AssessmentId, AssessmentResult, AssessmentStatus, Control, ControlId, FindingId,
    Framework, FrameworkId, GrcError, Mapping, Requirement, TrackerId,
};
use grc_state::{Finding, FindingStatus, RemediationTracker};

pub type StoreResult<T> = Result<T, GrcError>;

// ---------------------------------------------------------------------------
// Control library
// ---------------------------------------------------------------------------

/// Requirement filters, AND-combined. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementFilter {
    /// Exact domain match.
    #[serde(default)]
    pub domain: Option<String>,
    /// Exact category match.
    #[serde(default)]
    pub category: Option<String>,
    /// Keep only critical and high priority requirements.
    #[serde(default)]
    pub priority_only: bool,
}

impl RequirementFilter {
    pub fn matches(&self, req: &Requirement) -> bool {
        if let Some(domain) = &self.domain {
            if req.domain.as_deref() != Some(domain.as_str()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if req.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if self.priority_only && !req.priority.is_some_and(|p| p.is_elevated()) {
            return false;
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_none() && self.category.is_none() && !self.priority_only
    }
}

/// A mapping joined to its control. `control` is `None` when the mapped
/// control no longer exists in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRecord {
    pub mapping: Mapping,
    pub control: Option<Control>,
}

/// Read-only access to the control library.
pub trait ControlLibrary: Send + Sync {
    /// All frameworks, or only those in `ids` when given.
    fn list_frameworks(&self, ids: Option<&[FrameworkId]>) -> StoreResult<Vec<Framework>>;

    /// Requirements of a framework, optionally filtered.
    fn list_requirements(
        &self,
        framework_id: FrameworkId,
        filter: Option<&RequirementFilter>,
    ) -> StoreResult<Vec<Requirement>>;

    /// Every mapping whose requirement belongs to `framework_id`.
    fn list_mappings_for_framework(&self, framework_id: FrameworkId)
        -> StoreResult<Vec<MappingRecord>>;

    /// Controls with the given ids. Unknown ids are skipped.
    fn list_controls_by_ids(&self, ids: &[ControlId]) -> StoreResult<Vec<Control>>;

    /// Assessments whose status is in `status_in`.
    fn list_assessments(&self, status_in: &[AssessmentStatus]) -> StoreResult<Vec<Assessment>>;

    /// Results belonging to any of the given assessments.
    fn list_assessment_results(
        &self,
        assessment_ids: &[AssessmentId],
    ) -> StoreResult<Vec<AssessmentResult>>;
}

// ---------------------------------------------------------------------------
// Remediation
// ---------------------------------------------------------------------------

/// Transactional view over findings and trackers.
pub trait RemediationTx {
    fn find_finding(&self, id: FindingId) -> StoreResult<Option<Finding>>;
    fn save_finding(&mut self, finding: &Finding) -> StoreResult<()>;
    fn find_tracker(&self, id: TrackerId) -> StoreResult<Option<RemediationTracker>>;
    fn save_tracker(&mut self, tracker: &RemediationTracker) -> StoreResult<()>;
    /// Trackers of `finding_id` with no completion date, including writes
    /// staged earlier in the same transaction.
    fn count_open_trackers_for_finding(&self, finding_id: FindingId) -> StoreResult<usize>;
}

/// Findings and remediation trackers.
pub trait RemediationStore: Send + Sync {
    fn find_finding(&self, id: FindingId) -> StoreResult<Option<Finding>>;

    /// Findings with the given ids, in the order requested. Unknown ids are skipped.
    fn list_findings_by_ids(&self, ids: &[FindingId]) -> StoreResult<Vec<Finding>>;

    fn count_findings_with_status(&self, status: FindingStatus) -> StoreResult<usize>;

    fn find_tracker(&self, id: TrackerId) -> StoreResult<Option<RemediationTracker>>;

    /// Upsert outside of a transaction (creation and progress edits).
    fn save_tracker(&self, tracker: &RemediationTracker) -> StoreResult<()>;

    /// Trackers with no completion date, in query order.
    fn list_open_trackers(&self) -> StoreResult<Vec<RemediationTracker>>;

    /// Trackers completed strictly after `after`, regardless of finding state.
    fn list_trackers_completed_after(&self, after: NaiveDate)
        -> StoreResult<Vec<RemediationTracker>>;

    fn list_trackers_for_finding(&self, finding_id: FindingId)
        -> StoreResult<Vec<RemediationTracker>>;

    /// Run `work` atomically. Staged writes are applied only if it returns `Ok`.
    fn transaction<R, F>(&self, work: F) -> StoreResult<R>
    where
        F: FnOnce(&mut dyn RemediationTx) -> StoreResult<R>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use grc_core::{Priority, RequirementId};

    fn req(domain: Option<&str>, category: Option<&str>, priority: Option<Priority>) -> Requirement {
        Requirement {
            id: RequirementId::new(),
            framework_id: FrameworkId::new(),
            identifier: "R".into(),
            text: "text".into(),
            domain: domain.map(str::to_string),
            category: category.map(str::to_string),
            priority,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = RequirementFilter::default();
        assert!(f.is_empty());
        assert!(f.matches(&req(None, None, None)));
    }

    #[test]
    fn filters_are_and_combined() {
        let f = RequirementFilter {
            domain: Some("Access Control".into()),
            category: Some("Technical".into()),
            priority_only: true,
        };
        assert!(f.matches(&req(Some("Access Control"), Some("Technical"), Some(Priority::High))));
        assert!(!f.matches(&req(Some("Access Control"), Some("Technical"), Some(Priority::Medium))));
        assert!(!f.matches(&req(Some("Access Control"), Some("Physical"), Some(Priority::Critical))));
        assert!(!f.matches(&req(Some("Logging"), Some("Technical"), Some(Priority::Critical))));
    }

    #[test]
    fn priority_only_drops_unset_priority() {
        let f = RequirementFilter {
            priority_only: true,
            ..Default::default()
        };
        assert!(!f.matches(&req(None, None, None)));
        assert!(f.matches(&req(None, None, Some(Priority::Critical))));
    }
}
