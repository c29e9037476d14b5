//! Tracker view returned by the remediation operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use grc_state::{Finding, RemediationStatus, RemediationTracker};

/// A tracker joined to its finding, with the status derived as of `today`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerView {
    #[serde(flatten)]
    pub tracker: RemediationTracker,
    /// Empty when the finding no longer exists.
    pub finding_identifier: String,
    pub finding_title: String,
    pub days_until_due: i64,
    pub status: RemediationStatus,
}

impl TrackerView {
    pub fn new(tracker: RemediationTracker, finding: Option<&Finding>, today: NaiveDate) -> Self {
        Self {
            finding_identifier: finding
                .map(|f| f.finding_identifier.clone())
                .unwrap_or_default(),
            finding_title: finding.map(|f| f.title.clone()).unwrap_or_default(),
            days_until_due: tracker.days_until_due(today),
            status: tracker.status(today),
            tracker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use grc_core::FindingId;
    use grc_state::{FindingSeverity, FindingStatus, NewTracker};

    #[test]
    fn view_flattens_tracker_and_derives_status() {
        let created = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        let finding = Finding {
            id: FindingId::new(),
            finding_identifier: "FND-7".into(),
            title: "Stale admin accounts".into(),
            severity: FindingSeverity::High,
            status: FindingStatus::InProgress,
            remediation_due_date: None,
            remediation_completed_date: None,
            created_at: created,
            updated_at: created,
        };
        let tracker = RemediationTracker::open(
            finding.id,
            NewTracker {
                priority: None,
                sla_due_date: NaiveDate::from_ymd_opt(2026, 5, 10).unwrap(),
                remediation_steps: None,
                assigned_to: None,
            },
            created,
        );
        let today = NaiveDate::from_ymd_opt(2026, 5, 5).unwrap();
        let view = TrackerView::new(tracker.clone(), Some(&finding), today);

        assert_eq!(view.days_until_due, 5);
        assert_eq!(view.status, RemediationStatus::AtRisk);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], serde_json::json!(tracker.id));
        assert_eq!(json["finding_identifier"], "FND-7");
        assert_eq!(json["status"], "at_risk");
        assert_eq!(json["priority"], "medium");
    }

    #[test]
    fn missing_finding_gives_empty_labels() {
        let created = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        let tracker = RemediationTracker::open(
            FindingId::new(),
            NewTracker {
                priority: None,
                sla_due_date: NaiveDate::from_ymd_opt(2026, 5, 10).unwrap(),
                remediation_steps: None,
                assigned_to: None,
            },
            created,
        );
        let view = TrackerView::new(tracker, None, NaiveDate::from_ymd_opt(2026, 5, 20).unwrap());
        assert!(view.finding_identifier.is_empty());
        assert_eq!(view.status, RemediationStatus::Overdue);
        assert_eq!(view.days_until_due, -10);
    }
}
