//! # Scorecard Aggregation
//!
//! Per framework:
//!
//! - resolve every requirement, then group by domain (`"Other"` when unset);
//! - `overallCompliance = round((met + not_applicable) / total * 100)`;
//! - count implementation states over the distinct mapped controls;
//! - link assessments that select the framework and average the
//!   effectiveness ratings of completed ones over mapped controls (an unrated
//!   result counts as 0 and stays in the denominator);
//! - estimate a trend from controls implemented in the last 30 days.
//!
//! Across frameworks, `averageCompliance` is the unweighted mean of each
//! framework's `overallCompliance`; a small framework weighs as much as a
//! large one.
//!
//! Frameworks without requirements are omitted. A framework whose reads fail
//! is reported as a zeroed scorecard flagged `degraded`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use grc_core::percent::{percentage, round_half_up, rounded_mean};
use grc_core::{Clock, Framework, FrameworkId, GrcError, ImplementationStatus};
use grc_store::query::{assessment_view, framework_view, AssessmentView, FrameworkView};
use grc_store::ControlLibrary;

use crate::gap::GapSeverity;
use crate::resolver::{resolve_requirement, ComplianceStatus};

/// Look-back window of the trend estimate.
pub const TREND_WINDOW_DAYS: i64 = 30;

/// Change (in percentage points) beyond which a trend is not `stable`.
pub const TREND_THRESHOLD: i64 = 2;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainBreakdown {
    pub domain: String,
    pub total_requirements: usize,
    pub met: usize,
    pub not_met: usize,
    pub partially_met: usize,
    pub not_applicable: usize,
    pub compliance_percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlImplementationStatus {
    pub implemented: usize,
    pub in_progress: usize,
    pub planned: usize,
    pub not_implemented: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResults {
    pub completed: usize,
    pub in_progress: usize,
    pub average_score: i64,
}

/// NOT_MET requirements bucketed by gap severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapCounts {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl TrendDirection {
    pub fn from_change(change: i64) -> Self {
        if change > TREND_THRESHOLD {
            Self::Improving
        } else if change < -TREND_THRESHOLD {
            Self::Declining
        } else {
            Self::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub previous_period: u32,
    pub change: i64,
    pub trend: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkScorecard {
    pub framework_id: FrameworkId,
    pub framework_name: String,
    pub framework_code: String,
    pub overall_compliance: u32,
    pub total_requirements: usize,
    pub met_requirements: usize,
    pub not_met_requirements: usize,
    pub partially_met_requirements: usize,
    pub not_applicable_requirements: usize,
    pub breakdown_by_domain: Vec<DomainBreakdown>,
    pub control_implementation_status: ControlImplementationStatus,
    pub assessment_results: AssessmentResults,
    pub gaps: GapCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    /// Set when the framework's data could not be read.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
}

impl FrameworkScorecard {
    /// Zeroed scorecard for a framework whose reads failed.
    pub fn degraded(framework: &Framework) -> Self {
        Self {
            framework_id: framework.id,
            framework_name: framework.name.clone(),
            framework_code: framework.code.clone(),
            overall_compliance: 0,
            total_requirements: 0,
            met_requirements: 0,
            not_met_requirements: 0,
            partially_met_requirements: 0,
            not_applicable_requirements: 0,
            breakdown_by_domain: Vec::new(),
            control_implementation_status: ControlImplementationStatus::default(),
            assessment_results: AssessmentResults::default(),
            gaps: GapCounts::default(),
            trend: None,
            degraded: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardSummary {
    pub total_frameworks: usize,
    pub total_requirements: usize,
    pub total_met: usize,
    pub total_not_met: usize,
    pub average_compliance: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub generated_at: DateTime<Utc>,
    pub frameworks: Vec<FrameworkScorecard>,
    /// Unrounded mean of the per-framework compliance.
    pub overall_compliance: f64,
    pub summary: ScorecardSummary,
}

// ---------------------------------------------------------------------------
// Pure scoring
// ---------------------------------------------------------------------------

/// Score one framework. Returns `None` when it has no requirements.
pub fn score_framework(
    view: &FrameworkView,
    assessments: &AssessmentView,
    now: DateTime<Utc>,
) -> Option<FrameworkScorecard> {
    if view.requirements.is_empty() {
        return None;
    }

    let mut domains: Vec<DomainBreakdown> = Vec::new();
    let mut domain_index: HashMap<String, usize> = HashMap::new();
    let mut gaps = GapCounts::default();
    let (mut met, mut not_met, mut partially_met, mut not_applicable) = (0, 0, 0, 0);

    for entry in &view.requirements {
        let status = resolve_requirement(&entry.mappings);
        let domain_name = entry.requirement.domain_or_other();
        let pos = *domain_index
            .entry(domain_name.to_string())
            .or_insert_with(|| {
                domains.push(DomainBreakdown {
                    domain: domain_name.to_string(),
                    ..Default::default()
                });
                domains.len() - 1
            });
        let domain = &mut domains[pos];
        domain.total_requirements += 1;

        match status {
            ComplianceStatus::Met => {
                met += 1;
                domain.met += 1;
            }
            ComplianceStatus::NotMet => {
                not_met += 1;
                domain.not_met += 1;
                gaps.total += 1;
                match GapSeverity::from_priority(entry.requirement.priority) {
                    GapSeverity::Critical => gaps.critical += 1,
                    GapSeverity::High => gaps.high += 1,
                    GapSeverity::Medium => gaps.medium += 1,
                    GapSeverity::Low => gaps.low += 1,
                }
            }
            ComplianceStatus::PartiallyMet => {
                partially_met += 1;
                domain.partially_met += 1;
            }
            ComplianceStatus::NotApplicable => {
                not_applicable += 1;
                domain.not_applicable += 1;
            }
        }
    }
    for domain in &mut domains {
        domain.compliance_percentage =
            percentage(domain.met + domain.not_applicable, domain.total_requirements);
    }

    let total = view.requirements.len();
    let overall_compliance = percentage(met + not_applicable, total);

    let mut implementation = ControlImplementationStatus::default();
    for control in &view.controls {
        match control.implementation_status {
            ImplementationStatus::Implemented => implementation.implemented += 1,
            ImplementationStatus::InProgress => implementation.in_progress += 1,
            ImplementationStatus::Planned => implementation.planned += 1,
            ImplementationStatus::NotImplemented => implementation.not_implemented += 1,
            ImplementationStatus::NotApplicable => {}
        }
    }

    let framework_id = view.framework.id;
    let mapped = view.mapped_control_ids();
    let (completed, in_progress) = assessments.counts_for(framework_id);
    let average_score = rounded_mean(
        assessments
            .results_for(framework_id, &mapped)
            .map(|r| f64::from(r.effectiveness_rating.unwrap_or(0))),
    );

    let trend = estimate_trend(view, overall_compliance, now);

    tracing::debug!(
        framework = %view.framework.code,
        total,
        met,
        not_met,
        overall_compliance,
        "framework scored"
    );

    Some(FrameworkScorecard {
        framework_id,
        framework_name: view.framework.name.clone(),
        framework_code: view.framework.code.clone(),
        overall_compliance,
        total_requirements: total,
        met_requirements: met,
        not_met_requirements: not_met,
        partially_met_requirements: partially_met,
        not_applicable_requirements: not_applicable,
        breakdown_by_domain: domains,
        control_implementation_status: implementation,
        assessment_results: AssessmentResults {
            completed,
            in_progress,
            average_score,
        },
        gaps,
        trend,
        degraded: false,
    })
}

/// Estimate where compliance stood 30 days ago by assuming every control
/// implemented within the window was not implemented before it.
fn estimate_trend(view: &FrameworkView, current: u32, now: DateTime<Utc>) -> Option<Trend> {
    if view.controls.is_empty() {
        return None;
    }
    let cutoff = now - Duration::days(TREND_WINDOW_DAYS);
    let implemented = view.controls.iter().filter(|c| c.is_implemented()).count();
    let recently_implemented = view
        .controls
        .iter()
        .filter(|c| c.is_implemented() && c.updated_at.is_some_and(|at| at >= cutoff))
        .count();
    let previous = percentage(implemented - recently_implemented, view.controls.len());
    let change = i64::from(current) - i64::from(previous);
    Some(Trend {
        previous_period: previous,
        change,
        trend: TrendDirection::from_change(change),
    })
}

/// Roll framework scorecards into the response.
pub fn summarize(frameworks: Vec<FrameworkScorecard>, generated_at: DateTime<Utc>) -> Scorecard {
    let overall = if frameworks.is_empty() {
        0.0
    } else {
        frameworks
            .iter()
            .map(|f| f64::from(f.overall_compliance))
            .sum::<f64>()
            / frameworks.len() as f64
    };
    let summary = ScorecardSummary {
        total_frameworks: frameworks.len(),
        total_requirements: frameworks.iter().map(|f| f.total_requirements).sum(),
        total_met: frameworks.iter().map(|f| f.met_requirements).sum(),
        total_not_met: frameworks.iter().map(|f| f.not_met_requirements).sum(),
        average_compliance: round_half_up(overall),
    };
    Scorecard {
        generated_at,
        frameworks,
        overall_compliance: overall,
        summary,
    }
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Builds scorecards from a [`ControlLibrary`].
pub struct ScorecardAggregator<L: ?Sized> {
    library: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<L: ControlLibrary + ?Sized> ScorecardAggregator<L> {
    pub fn new(library: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self { library, clock }
    }

    /// Scorecard for the given frameworks, or for every framework.
    ///
    /// An explicitly requested framework that does not exist is `NotFound`.
    /// Failing to list frameworks at all is propagated; per-framework read
    /// failures degrade that framework only.
    pub fn generate(&self, framework_ids: Option<&[FrameworkId]>) -> Result<Scorecard, GrcError> {
        let now = self.clock.now();
        let frameworks = self.library.list_frameworks(framework_ids)?;
        if let Some(ids) = framework_ids {
            if let Some(missing) = ids.iter().find(|id| !frameworks.iter().any(|f| f.id == **id)) {
                return Err(GrcError::not_found("framework", missing));
            }
        }

        let assessments = assessment_view(self.library.as_ref()).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "assessments unavailable; scoring without them");
            AssessmentView::default()
        });

        let mut scorecards = Vec::with_capacity(frameworks.len());
        for framework in frameworks {
            match framework_view(self.library.as_ref(), framework.clone()) {
                Ok(view) => scorecards.extend(score_framework(&view, &assessments, now)),
                Err(err) => {
                    tracing::warn!(
                        framework = %framework.code,
                        error = %err,
                        "framework data unavailable; reporting degraded scorecard"
                    );
                    scorecards.push(FrameworkScorecard::degraded(&framework));
                }
            }
        }
        Ok(summarize(scorecards, now))
    }
}
