//! # grc-scoring — Compliance Posture Scoring
//!
//! - **Resolver** (`resolver.rs`): derives a requirement's
//!   [`ComplianceStatus`] from its mappings and the mapped controls'
//!   implementation states. Pure, never cached.
//!
//! - **Scorecard** (`scorecard.rs`): rolls verdicts up per domain and per
//!   framework, adds control-implementation counts, assessment averages, and
//!   a 30-day trend estimate, then summarizes across frameworks.
//!
//! - **Gap analysis** (`gap.rs`): works from raw mapping counts, independent
//!   of the resolver, to list unmapped requirements, classify their severity,
//!   and emit advisory recommendations.
//!
//! Both report engines are batch loops over frameworks. A framework whose
//! reads fail is logged and degraded; it never fails the whole report.

pub mod gap;
pub mod resolver;
pub mod scorecard;

pub use gap::{
    FrameworkGapAnalysis, GapAnalysis, GapAnalysisQuery, GapAnalyzer, GapSeverity,
    RequirementCoverageLevel, RequirementGap,
};
pub use resolver::{resolve_requirement, ComplianceStatus};
pub use scorecard::{
    DomainBreakdown, FrameworkScorecard, Scorecard, ScorecardAggregator, ScorecardSummary,
    Trend, TrendDirection,
};
