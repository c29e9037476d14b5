//! # Gap Analysis
//!
//! Works from requirement/mapping counts alone: "mapped" means at least one
//! mapping, regardless of coverage level or control state. A gap is a
//! requirement with zero mappings after filtering.
//!
//! Severity counting is deliberately asymmetric. Each framework's
//! `criticalGapsCount` counts only `critical` gaps, while the response-level
//! `criticalGapsCount` counts `critical` and `high` together.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use grc_core::percent::percentage;
use grc_core::{Clock, Framework, FrameworkId, GrcError, Priority, RequirementId};
use grc_store::query::{requirement_coverage, RequirementCoverage};
use grc_store::{ControlLibrary, RequirementFilter};

/// Frameworks below this coverage are named in a recommendation.
pub const LOW_FRAMEWORK_COVERAGE: f64 = 60.0;

/// Average framework coverage below this triggers the low-coverage advisory.
pub const LOW_AVERAGE_COVERAGE: f64 = 50.0;

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Optional, AND-combined filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysisQuery {
    #[serde(default)]
    pub framework_ids: Option<Vec<FrameworkId>>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority_only: bool,
}

impl GapAnalysisQuery {
    fn requirement_filter(&self) -> RequirementFilter {
        RequirementFilter {
            domain: self.domain.clone(),
            category: self.category.clone(),
            priority_only: self.priority_only,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl GapSeverity {
    /// critical, high and medium map to themselves; low and unset map to low.
    pub fn from_priority(priority: Option<Priority>) -> Self {
        match priority {
            Some(Priority::Critical) => Self::Critical,
            Some(Priority::High) => Self::High,
            Some(Priority::Medium) => Self::Medium,
            Some(Priority::Low) | None => Self::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementCoverageLevel {
    None,
    Partial,
    Full,
}

impl RequirementCoverageLevel {
    pub fn of(row: &RequirementCoverage) -> Self {
        if row.mapped_controls_count == 0 {
            Self::None
        } else if row.has_full_coverage {
            Self::Full
        } else {
            Self::Partial
        }
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementGap {
    pub requirement_id: RequirementId,
    pub requirement_identifier: String,
    pub requirement_text: String,
    pub framework_id: FrameworkId,
    pub framework_name: String,
    pub framework_code: String,
    pub domain: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub gap_severity: GapSeverity,
    pub coverage_level: RequirementCoverageLevel,
    pub mapped_controls_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkGapAnalysis {
    pub framework_id: FrameworkId,
    pub framework_name: String,
    pub framework_code: String,
    pub total_requirements: usize,
    pub mapped_requirements: usize,
    pub unmapped_requirements: usize,
    pub partial_coverage_requirements: usize,
    pub coverage_percentage: u32,
    pub critical_gaps_count: usize,
    pub high_priority_gaps_count: usize,
    pub gaps: Vec<RequirementGap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysis {
    pub generated_at: DateTime<Utc>,
    pub total_frameworks: usize,
    pub total_requirements: usize,
    pub total_mapped_requirements: usize,
    pub total_unmapped_requirements: usize,
    pub overall_coverage_percentage: u32,
    pub frameworks: Vec<FrameworkGapAnalysis>,
    pub all_gaps: Vec<RequirementGap>,
    /// Gaps of severity critical or high, across all frameworks.
    pub critical_gaps_count: usize,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Pure analysis
// ---------------------------------------------------------------------------

/// Analyze one framework's filtered requirements. `None` when nothing
/// survived the filters.
pub fn analyze_framework(
    framework: &Framework,
    rows: &[RequirementCoverage],
) -> Option<FrameworkGapAnalysis> {
    if rows.is_empty() {
        return None;
    }
    let mut mapped = 0;
    let mut partial = 0;
    let mut gaps = Vec::new();
    for row in rows {
        let level = RequirementCoverageLevel::of(row);
        if level == RequirementCoverageLevel::None {
            let req = &row.requirement;
            gaps.push(RequirementGap {
                requirement_id: req.id,
                requirement_identifier: req.identifier.clone(),
                requirement_text: req.text.clone(),
                framework_id: framework.id,
                framework_name: framework.name.clone(),
                framework_code: framework.code.clone(),
                domain: req.domain.clone(),
                category: req.category.clone(),
                priority: req.priority,
                gap_severity: GapSeverity::from_priority(req.priority),
                coverage_level: level,
                mapped_controls_count: 0,
            });
        } else {
            mapped += 1;
            if level != RequirementCoverageLevel::Full {
                partial += 1;
            }
        }
    }
    let count = |s: GapSeverity| gaps.iter().filter(|g| g.gap_severity == s).count();
    let critical_gaps_count = count(GapSeverity::Critical);
    let high_priority_gaps_count = count(GapSeverity::High);

    Some(FrameworkGapAnalysis {
        framework_id: framework.id,
        framework_name: framework.name.clone(),
        framework_code: framework.code.clone(),
        total_requirements: rows.len(),
        mapped_requirements: mapped,
        unmapped_requirements: gaps.len(),
        partial_coverage_requirements: partial,
        coverage_percentage: percentage(mapped, rows.len()),
        critical_gaps_count,
        high_priority_gaps_count,
        gaps,
    })
}

/// Advisory messages, every applicable one in a fixed order.
pub fn recommendations(frameworks: &[FrameworkGapAnalysis]) -> Vec<String> {
    let mut out = Vec::new();

    if !frameworks.is_empty() {
        let average = frameworks
            .iter()
            .map(|f| f64::from(f.coverage_percentage))
            .sum::<f64>()
            / frameworks.len() as f64;
        if average < LOW_AVERAGE_COVERAGE {
            out.push(format!(
                "Overall control coverage is low ({average:.0}% average across frameworks). \
                 Map existing controls to unmapped requirements before adding new ones."
            ));
        }
    }

    let critical: usize = frameworks.iter().map(|f| f.critical_gaps_count).sum();
    if critical > 0 {
        out.push(format!(
            "{critical} critical requirement(s) have no mapped controls and need immediate attention."
        ));
    }

    let high: usize = frameworks.iter().map(|f| f.high_priority_gaps_count).sum();
    if high > 0 {
        out.push(format!(
            "{high} high-priority requirement(s) are unmapped; prioritize them in the next remediation cycle."
        ));
    }

    let low: Vec<&str> = frameworks
        .iter()
        .filter(|f| f64::from(f.coverage_percentage) < LOW_FRAMEWORK_COVERAGE)
        .map(|f| f.framework_name.as_str())
        .collect();
    if !low.is_empty() {
        out.push(format!(
            "Frameworks below {LOW_FRAMEWORK_COVERAGE:.0}% coverage: {}.",
            low.join(", ")
        ));
    }

    let partial: usize = frameworks.iter().map(|f| f.partial_coverage_requirements).sum();
    if partial > 0 {
        out.push(format!(
            "{partial} requirement(s) have only partial coverage; strengthen their control mappings."
        ));
    }

    if out.is_empty() {
        out.push(
            "Coverage looks good: no significant gaps found in the analyzed frameworks.".to_string(),
        );
    }
    out
}

/// Roll framework analyses into the response.
pub fn summarize(frameworks: Vec<FrameworkGapAnalysis>, generated_at: DateTime<Utc>) -> GapAnalysis {
    let total_requirements: usize = frameworks.iter().map(|f| f.total_requirements).sum();
    let total_mapped: usize = frameworks.iter().map(|f| f.mapped_requirements).sum();
    let total_unmapped: usize = frameworks.iter().map(|f| f.unmapped_requirements).sum();
    let all_gaps: Vec<RequirementGap> = frameworks
        .iter()
        .flat_map(|f| f.gaps.iter().cloned())
        .collect();
    let critical_gaps_count = all_gaps
        .iter()
        .filter(|g| matches!(g.gap_severity, GapSeverity::Critical | GapSeverity::High))
        .count();
    let recommendations = recommendations(&frameworks);

    GapAnalysis {
        generated_at,
        total_frameworks: frameworks.len(),
        total_requirements,
        total_mapped_requirements: total_mapped,
        total_unmapped_requirements: total_unmapped,
        overall_coverage_percentage: percentage(total_mapped, total_requirements),
        frameworks,
        all_gaps,
        critical_gaps_count,
        recommendations,
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Runs gap analysis against a [`ControlLibrary`].
pub struct GapAnalyzer<L: ?Sized> {
    library: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<L: ControlLibrary + ?Sized> GapAnalyzer<L> {
    pub fn new(library: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self { library, clock }
    }

    /// Analyze the frameworks selected by `query`.
    ///
    /// An explicitly requested framework that does not exist is `NotFound`.
    /// A framework whose reads fail is logged and skipped.
    pub fn analyze(&self, query: &GapAnalysisQuery) -> Result<GapAnalysis, GrcError> {
        let ids = query.framework_ids.as_deref();
        let frameworks = self.library.list_frameworks(ids)?;
        if let Some(ids) = ids {
            if let Some(missing) = ids.iter().find(|id| !frameworks.iter().any(|f| f.id == **id)) {
                return Err(GrcError::not_found("framework", missing));
            }
        }

        let filter = query.requirement_filter();
        let mut analyses = Vec::with_capacity(frameworks.len());
        for framework in &frameworks {
            match requirement_coverage(self.library.as_ref(), framework.id, &filter) {
                Ok(rows) => {
                    if let Some(analysis) = analyze_framework(framework, &rows) {
                        tracing::debug!(
                            framework = %framework.code,
                            total = analysis.total_requirements,
                            gaps = analysis.unmapped_requirements,
                            "framework gap analysis"
                        );
                        analyses.push(analysis);
                    }
                }
                Err(err) => tracing::warn!(
                    framework = %framework.code,
                    error = %err,
                    "framework data unavailable; skipped in gap analysis"
                ),
            }
        }
        Ok(summarize(analyses, self.clock.now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grc_core::Requirement;
    use proptest::prelude::*;

    fn framework(name: &str) -> Framework {
        Framework {
            id: FrameworkId::new(),
            name: name.into(),
            code: name.to_uppercase(),
        }
    }

    fn row(fw: &Framework, priority: Option<Priority>, mapped: usize, full: bool) -> RequirementCoverage {
        RequirementCoverage {
            requirement: Requirement {
                id: RequirementId::new(),
                framework_id: fw.id,
                identifier: "R".into(),
                text: "text".into(),
                domain: None,
                category: None,
                priority,
            },
            mapped_controls_count: mapped,
            has_full_coverage: full,
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-06-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn severity_mapping_is_exact() {
        assert_eq!(GapSeverity::from_priority(Some(Priority::Critical)), GapSeverity::Critical);
        assert_eq!(GapSeverity::from_priority(Some(Priority::High)), GapSeverity::High);
        assert_eq!(GapSeverity::from_priority(Some(Priority::Medium)), GapSeverity::Medium);
        assert_eq!(GapSeverity::from_priority(Some(Priority::Low)), GapSeverity::Low);
        assert_eq!(GapSeverity::from_priority(None), GapSeverity::Low);
    }

    #[test]
    fn framework_counts() {
        let fw = framework("soc2");
        let rows = vec![
            row(&fw, Some(Priority::Critical), 0, false),
            row(&fw, Some(Priority::High), 0, false),
            row(&fw, None, 2, true),
            row(&fw, None, 1, false),
        ];
        let a = analyze_framework(&fw, &rows).unwrap();
        assert_eq!(a.total_requirements, 4);
        assert_eq!(a.mapped_requirements, 2);
        assert_eq!(a.unmapped_requirements, 2);
        assert_eq!(a.partial_coverage_requirements, 1);
        assert_eq!(a.coverage_percentage, 50);
        assert_eq!(a.critical_gaps_count, 1);
        assert_eq!(a.high_priority_gaps_count, 1);
        assert!(a
            .gaps
            .iter()
            .all(|g| g.coverage_level == RequirementCoverageLevel::None));
    }

    #[test]
    fn global_critical_count_includes_high() {
        let fw = framework("soc2");
        let rows = vec![
            row(&fw, Some(Priority::Critical), 0, false),
            row(&fw, Some(Priority::High), 0, false),
            row(&fw, Some(Priority::High), 0, false),
        ];
        let a = analyze_framework(&fw, &rows).unwrap();
        let per_framework = a.critical_gaps_count;
        let result = summarize(vec![a], now());
        assert_eq!(per_framework, 1);
        assert_eq!(result.critical_gaps_count, 3);
    }

    #[test]
    fn empty_framework_is_skipped() {
        assert!(analyze_framework(&framework("x"), &[]).is_none());
    }

    #[test]
    fn recommendations_in_order() {
        let weak = framework("Weak");
        let rows = vec![
            row(&weak, Some(Priority::Critical), 0, false),
            row(&weak, Some(Priority::High), 0, false),
            row(&weak, None, 0, false),
            row(&weak, None, 1, false),
        ];
        let a = analyze_framework(&weak, &rows).unwrap();
        let recs = recommendations(&[a]);
        assert_eq!(recs.len(), 5);
        assert!(recs[0].starts_with("Overall control coverage is low (25%"));
        assert!(recs[1].starts_with("1 critical"));
        assert!(recs[2].starts_with("1 high-priority"));
        assert_eq!(recs[3], "Frameworks below 60% coverage: Weak.");
        assert!(recs[4].starts_with("1 requirement(s) have only partial coverage"));
    }

    #[test]
    fn full_coverage_gets_positive_message() {
        let fw = framework("Strong");
        let rows = vec![row(&fw, None, 1, true), row(&fw, Some(Priority::High), 3, true)];
        let a = analyze_framework(&fw, &rows).unwrap();
        let recs = recommendations(&[a]);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].starts_with("Coverage looks good"));
    }

    #[test]
    fn no_frameworks_gets_positive_message_and_zero_coverage() {
        let result = summarize(Vec::new(), now());
        assert_eq!(result.overall_coverage_percentage, 0);
        assert_eq!(result.total_frameworks, 0);
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn query_deserializes_camel_case() {
        let q: GapAnalysisQuery =
            serde_json::from_str(r#"{"priorityOnly": true, "domain": "Access Control"}"#).unwrap();
        assert!(q.priority_only);
        assert_eq!(q.domain.as_deref(), Some("Access Control"));
        assert!(q.framework_ids.is_none());
    }

    fn arb_priority() -> impl Strategy<Value = Option<Priority>> {
        proptest::option::of(prop_oneof![
            Just(Priority::Critical),
            Just(Priority::High),
            Just(Priority::Medium),
            Just(Priority::Low),
        ])
    }

    proptest! {
        #[test]
        fn global_critical_dominates_each_framework(
            specs in proptest::collection::vec(
                proptest::collection::vec((arb_priority(), 0usize..3, any::<bool>()), 1..12),
                1..4,
            )
        ) {
            let analyses: Vec<_> = specs
                .iter()
                .filter_map(|rows| {
                    let fw = framework("F");
                    let rows: Vec<_> = rows.iter().map(|(p, m, f)| row(&fw, *p, *m, *f)).collect();
                    analyze_framework(&fw, &rows)
                })
                .collect();
            let max_framework = analyses.iter().map(|a| a.critical_gaps_count).max().unwrap_or(0);
            let result = summarize(analyses, now());
            prop_assert!(result.critical_gaps_count >= max_framework);
            prop_assert_eq!(
                result.critical_gaps_count,
                result.all_gaps.iter()
                    .filter(|g| matches!(g.gap_severity, GapSeverity::Critical | GapSeverity::High))
                    .count()
            );
            prop_assert!(result.overall_coverage_percentage <= 100);
        }
    }
}
