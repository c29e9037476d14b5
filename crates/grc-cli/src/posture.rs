//! # Scorecard and Gap Subcommands
//!
//! `grc scorecard` exits with code 1 when `--fail-under` is given and the
//! rounded average compliance falls below it, so CI pipelines can gate on
//! posture.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use grc_core::FrameworkId;
use grc_scoring::{GapAnalysisQuery, GapAnalyzer, ScorecardAggregator};

use crate::Session;

/// Arguments for `grc scorecard`.
#[derive(Args, Debug, Default)]
pub struct ScorecardArgs {
    /// Restrict to these framework ids (repeat or comma-separate).
    #[arg(long = "framework", value_name = "ID", value_delimiter = ',')]
    pub frameworks: Vec<FrameworkId>,

    /// Exit with code 1 when average compliance is below this percentage.
    #[arg(long, value_name = "PCT")]
    pub fail_under: Option<i64>,
}

/// Arguments for `grc gaps`.
#[derive(Args, Debug, Default)]
pub struct GapsArgs {
    /// Restrict to these framework ids (repeat or comma-separate).
    #[arg(long = "framework", value_name = "ID", value_delimiter = ',')]
    pub frameworks: Vec<FrameworkId>,

    /// Only requirements in this domain.
    #[arg(long)]
    pub domain: Option<String>,

    /// Only requirements in this category.
    #[arg(long)]
    pub category: Option<String>,

    /// Only critical and high priority requirements.
    #[arg(long)]
    pub priority_only: bool,
}

fn framework_filter(ids: &[FrameworkId]) -> Option<&[FrameworkId]> {
    (!ids.is_empty()).then_some(ids)
}

/// Execute `grc scorecard`.
pub fn run_scorecard(args: &ScorecardArgs, session: &Session, out: &mut dyn Write) -> Result<u8> {
    let aggregator = ScorecardAggregator::new(session.store.clone(), session.clock.clone());
    let scorecard = aggregator.generate(framework_filter(&args.frameworks))?;
    session.emit(&scorecard, out)?;

    if let Some(threshold) = args.fail_under {
        let average = scorecard.summary.average_compliance;
        if average < threshold {
            tracing::warn!(average, threshold, "compliance below threshold");
            return Ok(1);
        }
    }
    Ok(0)
}

/// Execute `grc gaps`.
pub fn run_gaps(args: &GapsArgs, session: &Session, out: &mut dyn Write) -> Result<u8> {
    let analyzer = GapAnalyzer::new(session.store.clone(), session.clock.clone());
    let query = GapAnalysisQuery {
        framework_ids: framework_filter(&args.frameworks).map(<[FrameworkId]>::to_vec),
        domain: args.domain.clone(),
        category: args.category.clone(),
        priority_only: args.priority_only,
    };
    let analysis = analyzer.analyze(&query)?;
    session.emit(&analysis, out)?;
    Ok(0)
}
