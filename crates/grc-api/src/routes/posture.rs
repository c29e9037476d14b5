//! # Posture Reports
//!
//! Read-only scorecard and gap-analysis endpoints.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use grc_core::FrameworkId;
use grc_scoring::{GapAnalysis, GapAnalysisQuery, Scorecard};

use crate::error::AppError;
use crate::extractors::{extract_query, non_empty, parse_id_list};
use crate::middleware::metrics::PostureEvent;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ScorecardParams {
    /// Comma-separated framework ids.
    pub framework_ids: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GapAnalysisParams {
    /// Comma-separated framework ids.
    pub framework_ids: Option<String>,
    pub domain: Option<String>,
    pub category: Option<String>,
    pub priority_only: Option<bool>,
}

impl GapAnalysisParams {
    fn into_query(self) -> Result<GapAnalysisQuery, AppError> {
        Ok(GapAnalysisQuery {
            framework_ids: parse_id_list::<FrameworkId>(self.framework_ids.as_deref())?,
            domain: non_empty(self.domain),
            category: non_empty(self.category),
            priority_only: self.priority_only.unwrap_or(false),
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/scorecard", get(get_scorecard))
        .route("/v1/gap-analysis", get(get_gap_analysis))
}

async fn get_scorecard(
    State(state): State<AppState>,
    params: Result<Query<ScorecardParams>, QueryRejection>,
) -> Result<Json<Scorecard>, AppError> {
    let params = extract_query(params)?;
    let ids = parse_id_list::<FrameworkId>(params.framework_ids.as_deref())?;
    let scorecard = state.scorecards.generate(ids.as_deref())?;
    state.metrics.record(PostureEvent::ScorecardGenerated);
    Ok(Json(scorecard))
}

async fn get_gap_analysis(
    State(state): State<AppState>,
    params: Result<Query<GapAnalysisParams>, QueryRejection>,
) -> Result<Json<GapAnalysis>, AppError> {
    let query = extract_query(params)?.into_query()?;
    let analysis = state.gaps.analyze(&query)?;
    state.metrics.record(PostureEvent::GapAnalysisPerformed);
    Ok(Json(analysis))
}
