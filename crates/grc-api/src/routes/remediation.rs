//! # Remediation Tracking
//!
//! Tracker lifecycle endpoints and the SLA dashboard. Every tracker is
//! returned as a [`TrackerView`] carrying its derived status.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use grc_core::{FindingId, TrackerId};
use grc_remediation::{CompletionOutcome, RemediationDashboard, TrackerView};
use grc_state::{CompletionDetails, NewTracker, TrackerUpdate};

use crate::error::AppError;
use crate::extractors::{extract_json, extract_path};
use crate::middleware::metrics::PostureEvent;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/remediation/dashboard", get(get_dashboard))
        .route(
            "/v1/findings/{finding_id}/trackers",
            post(create_tracker).get(list_trackers),
        )
        .route("/v1/remediation/trackers/{tracker_id}", patch(update_tracker))
        .route(
            "/v1/remediation/trackers/{tracker_id}/complete",
            post(complete_tracker),
        )
}

async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<RemediationDashboard>, AppError> {
    Ok(Json(state.remediation.dashboard()?))
}

async fn create_tracker(
    State(state): State<AppState>,
    finding_id: Result<Path<FindingId>, PathRejection>,
    body: Result<Json<NewTracker>, JsonRejection>,
) -> Result<(StatusCode, Json<TrackerView>), AppError> {
    let finding_id = extract_path(finding_id)?;
    let input = extract_json(body)?;
    let view = state.remediation.create_tracker(finding_id, input)?;
    state.metrics.record(PostureEvent::TrackerCreated);
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_trackers(
    State(state): State<AppState>,
    finding_id: Result<Path<FindingId>, PathRejection>,
) -> Result<Json<Vec<TrackerView>>, AppError> {
    let finding_id = extract_path(finding_id)?;
    Ok(Json(state.remediation.get_trackers_by_finding(finding_id)?))
}

async fn update_tracker(
    State(state): State<AppState>,
    tracker_id: Result<Path<TrackerId>, PathRejection>,
    body: Result<Json<TrackerUpdate>, JsonRejection>,
) -> Result<Json<TrackerView>, AppError> {
    let tracker_id = extract_path(tracker_id)?;
    let update = extract_json(body)?;
    let view = state.remediation.update_tracker(tracker_id, update)?;
    state.metrics.record(PostureEvent::TrackerUpdated);
    Ok(Json(view))
}

async fn complete_tracker(
    State(state): State<AppState>,
    tracker_id: Result<Path<TrackerId>, PathRejection>,
    body: Result<Json<CompletionDetails>, JsonRejection>,
) -> Result<Json<CompletionOutcome>, AppError> {
    let tracker_id = extract_path(tracker_id)?;
    let details = extract_json(body)?;
    let outcome = match state.remediation.complete_remediation(tracker_id, details) {
        Ok(outcome) => outcome,
        Err(err) => {
            state.metrics.record(PostureEvent::CompletionRolledBack);
            return Err(err.into());
        }
    };
    state.metrics.record(PostureEvent::RemediationCompleted {
        finding_resolved: outcome.finding_resolved,
    });
    Ok(Json(outcome))
}
