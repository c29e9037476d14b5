//! # Requirement Compliance Resolver
//!
//! Rules, evaluated in order:
//!
//! 1. No mappings: `not_met`.
//! 2. Every mapping has coverage `not_applicable`: `not_applicable`, whatever
//!    the controls look like.
//! 3. Otherwise, over the distinct mapped controls that exist:
//!    - at least one `full` mapping and `implemented == full.len()`: `met`;
//!    - any implemented control, any in-progress control, or any `partial`
//!      mapping: `partially_met`;
//!    - else `not_met`.
//!
//! A mapping whose control is missing counts toward the coverage tallies
//! but contributes no control state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use grc_core::{ControlId, CoverageLevel, ImplementationStatus};
use grc_store::ResolvedMapping;

/// Derived per-requirement verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Met,
    NotMet,
    PartiallyMet,
    NotApplicable,
}

impl ComplianceStatus {
    /// Met and not-applicable both count toward compliance percentages.
    pub fn counts_as_compliant(self) -> bool {
        matches!(self, Self::Met | Self::NotApplicable)
    }
}

pub fn resolve_requirement(mappings: &[ResolvedMapping]) -> ComplianceStatus {
    if mappings.is_empty() {
        return ComplianceStatus::NotMet;
    }
    if mappings
        .iter()
        .all(|m| m.coverage_level == CoverageLevel::NotApplicable)
    {
        return ComplianceStatus::NotApplicable;
    }

    let mut states: HashMap<ControlId, ImplementationStatus> = HashMap::new();
    for control in mappings.iter().filter_map(|m| m.control.as_ref()) {
        states.insert(control.id, control.implementation_status);
    }
    let implemented = states
        .values()
        .filter(|s| **s == ImplementationStatus::Implemented)
        .count();
    let in_progress = states
        .values()
        .filter(|s| **s == ImplementationStatus::InProgress)
        .count();
    let full = mappings
        .iter()
        .filter(|m| m.coverage_level == CoverageLevel::Full)
        .count();
    let partial_coverage = mappings
        .iter()
        .any(|m| m.coverage_level == CoverageLevel::Partial);

    if full > 0 && implemented == full {
        ComplianceStatus::Met
    } else if implemented > 0 || in_progress > 0 || partial_coverage {
        ComplianceStatus::PartiallyMet
    } else {
        ComplianceStatus::NotMet
    }
}
