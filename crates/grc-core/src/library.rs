//! # Control-Library Records
//!
//! Read-only snapshots of the records owned by the external control-library
//! services: frameworks, their requirements, unified controls, the
//! requirement-to-control mappings, and assessments with their per-control
//! results. The posture engines never mutate these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GrcError;
use crate::identity::{
    AssessmentId, AssessmentResultId, ControlId, FrameworkId, MappingId, RequirementId,
};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Requirement priority as declared by the framework author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Whether this priority survives a `priority_only` gap filter.
    pub fn is_elevated(self) -> bool {
        matches!(self, Self::Critical | Self::High)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Implementation state of a unified control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationStatus {
    NotImplemented,
    Planned,
    InProgress,
    Implemented,
    NotApplicable,
}

/// How completely a mapped control is asserted to satisfy a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageLevel {
    Full,
    Partial,
    NotApplicable,
}

/// Lifecycle status of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    NotStarted,
    InProgress,
    UnderReview,
    Completed,
    Cancelled,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A compliance framework (ISO 27001, SOC 2, PCI-DSS, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framework {
    pub id: FrameworkId,
    pub name: String,
    pub code: String,
}

/// A single requirement within a framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: RequirementId,
    pub framework_id: FrameworkId,
    /// Framework-native identifier, e.g. "A.5.1" or "CC6.1".
    pub identifier: String,
    pub text: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl Requirement {
    /// Domain used for grouping; requirements without one fall into "Other".
    pub fn domain_or_other(&self) -> &str {
        self.domain.as_deref().unwrap_or("Other")
    }
}

/// A unified control from the control library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub id: ControlId,
    pub identifier: String,
    pub implementation_status: ImplementationStatus,
    #[serde(default)]
    pub domain: Option<String>,
    /// Last modification instant; used as a proxy for when the
    /// implementation status last changed.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Control {
    pub fn is_implemented(&self) -> bool {
        self.implementation_status == ImplementationStatus::Implemented
    }
}

/// Many-to-many link between a requirement and a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub id: MappingId,
    pub requirement_id: RequirementId,
    pub control_id: ControlId,
    pub coverage_level: CoverageLevel,
}

/// An assessment spanning one or more frameworks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub status: AssessmentStatus,
    #[serde(default)]
    pub selected_framework_ids: Vec<FrameworkId>,
}

impl Assessment {
    /// An assessment belongs to a framework iff the framework is selected.
    pub fn covers(&self, framework_id: FrameworkId) -> bool {
        self.selected_framework_ids.contains(&framework_id)
    }
}

/// Effectiveness result of assessing one control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub id: AssessmentResultId,
    pub assessment_id: AssessmentId,
    pub control_id: ControlId,
    /// Rating on a 1..=5 scale, absent when not yet rated.
    #[serde(default)]
    pub effectiveness_rating: Option<u8>,
}

impl AssessmentResult {
    /// Reject ratings outside the 1..=5 scale.
    pub fn validate(&self) -> Result<(), GrcError> {
        match self.effectiveness_rating {
            Some(r) if !(1..=5).contains(&r) => Err(GrcError::Validation(format!(
                "assessment result {}: effectiveness_rating {r} outside 1..=5",
                self.id
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_elevation() {
        assert!(Priority::Critical.is_elevated());
        assert!(Priority::High.is_elevated());
        assert!(!Priority::Medium.is_elevated());
        assert!(!Priority::Low.is_elevated());
    }

    #[test]
    fn requirement_without_domain_groups_as_other() {
        let req = Requirement {
            id: RequirementId::new(),
            framework_id: FrameworkId::new(),
            identifier: "A.5.1".into(),
            text: "Policies for information security".into(),
            domain: None,
            category: None,
            priority: None,
        };
        assert_eq!(req.domain_or_other(), "Other");
    }

    #[test]
    fn assessment_covers_selected_frameworks_only() {
        let fw = FrameworkId::new();
        let a = Assessment {
            id: AssessmentId::new(),
            status: AssessmentStatus::Completed,
            selected_framework_ids: vec![fw],
        };
        assert!(a.covers(fw));
        assert!(!a.covers(FrameworkId::new()));
    }

    #[test]
    fn rating_validation() {
        let mut r = AssessmentResult {
            id: AssessmentResultId::new(),
            assessment_id: AssessmentId::new(),
            control_id: ControlId::new(),
            effectiveness_rating: Some(5),
        };
        assert!(r.validate().is_ok());
        r.effectiveness_rating = None;
        assert!(r.validate().is_ok());
        r.effectiveness_rating = Some(0);
        assert!(r.validate().is_err());
        r.effectiveness_rating = Some(6);
        assert!(r.validate().is_err());
    }

    #[test]
    fn enums_use_snake_case_on_the_wire() {
        let json = serde_json::to_string(&ImplementationStatus::NotImplemented).unwrap();
        assert_eq!(json, "\"not_implemented\"");
        let cov: CoverageLevel = serde_json::from_str("\"not_applicable\"").unwrap();
        assert_eq!(cov, CoverageLevel::NotApplicable);
    }
}
