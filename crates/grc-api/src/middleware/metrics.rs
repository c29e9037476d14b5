//! # Posture Metrics
//!
//! Counters for the posture service. The middleware labels every response
//! with its matched route and status; handlers record the engine events
//! behind those responses, since only they see the outcome (whether a
//! completion resolved its finding, or failed and wrote nothing).
//!
//! [`ApiMetrics::snapshot`] is served at `GET /metrics`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::{MatchedPath, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use parking_lot::Mutex;
use serde::Serialize;

/// Label for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Engine outcomes recorded by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostureEvent {
    ScorecardGenerated,
    GapAnalysisPerformed,
    TrackerCreated,
    TrackerUpdated,
    RemediationCompleted { finding_resolved: bool },
    /// A completion returned an error; its transaction was discarded.
    CompletionRolledBack,
}

#[derive(Debug, Default)]
struct Counters {
    scorecards_generated: AtomicU64,
    gap_analyses_performed: AtomicU64,
    trackers_created: AtomicU64,
    trackers_updated: AtomicU64,
    remediations_completed: AtomicU64,
    findings_resolved: AtomicU64,
    completions_rolled_back: AtomicU64,
    /// Keyed by (`"METHOD /matched/{path}"`, status code).
    responses: Mutex<BTreeMap<(String, u16), u64>>,
}

/// Shared handle to the service counters. Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    counters: Arc<Counters>,
}

/// Responses served for one route and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteResponses {
    pub route: String,
    pub status: u16,
    pub count: u64,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub scorecards_generated: u64,
    pub gap_analyses_performed: u64,
    pub trackers_created: u64,
    pub trackers_updated: u64,
    pub remediations_completed: u64,
    pub findings_resolved: u64,
    pub completions_rolled_back: u64,
    pub responses: Vec<RouteResponses>,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: PostureEvent) {
        let c = &self.counters;
        let counter = match event {
            PostureEvent::ScorecardGenerated => &c.scorecards_generated,
            PostureEvent::GapAnalysisPerformed => &c.gap_analyses_performed,
            PostureEvent::TrackerCreated => &c.trackers_created,
            PostureEvent::TrackerUpdated => &c.trackers_updated,
            PostureEvent::RemediationCompleted { finding_resolved } => {
                if finding_resolved {
                    c.findings_resolved.fetch_add(1, Ordering::Relaxed);
                }
                &c.remediations_completed
            }
            PostureEvent::CompletionRolledBack => &c.completions_rolled_back,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_response(&self, route: String, status: StatusCode) {
        *self
            .counters
            .responses
            .lock()
            .entry((route, status.as_u16()))
            .or_insert(0) += 1;
    }

    /// Responses served for `route` (e.g. `"GET /v1/scorecard"`) with `status`.
    pub fn responses(&self, route: &str, status: StatusCode) -> u64 {
        self.counters
            .responses
            .lock()
            .get(&(route.to_string(), status.as_u16()))
            .copied()
            .unwrap_or(0)
    }

    /// Responses across every route.
    pub fn requests(&self) -> u64 {
        self.counters.responses.lock().values().sum()
    }

    /// Responses with a 4xx or 5xx status.
    pub fn errors(&self) -> u64 {
        self.counters
            .responses
            .lock()
            .iter()
            .filter(|((_, status), _)| *status >= 400)
            .map(|(_, count)| count)
            .sum()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let c = &self.counters;
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        let responses = c
            .responses
            .lock()
            .iter()
            .map(|((route, status), count)| RouteResponses {
                route: route.clone(),
                status: *status,
                count: *count,
            })
            .collect();
        MetricsSnapshot {
            scorecards_generated: load(&c.scorecards_generated),
            gap_analyses_performed: load(&c.gap_analyses_performed),
            trackers_created: load(&c.trackers_created),
            trackers_updated: load(&c.trackers_updated),
            remediations_completed: load(&c.remediations_completed),
            findings_resolved: load(&c.findings_resolved),
            completions_rolled_back: load(&c.completions_rolled_back),
            responses,
        }
    }
}

fn route_label(request: &Request) -> String {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ROUTE, MatchedPath::as_str);
    format!("{} {path}", request.method())
}

/// Count the response under its matched route and status.
pub async fn metrics_middleware(
    State(metrics): State<ApiMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let route = route_label(&request);
    let response = next.run(request).await;
    metrics.record_response(route, response.status());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_counts_resolution_separately() {
        let metrics = ApiMetrics::new();
        metrics.record(PostureEvent::RemediationCompleted { finding_resolved: false });
        metrics.record(PostureEvent::RemediationCompleted { finding_resolved: true });
        metrics.record(PostureEvent::CompletionRolledBack);

        let snap = metrics.clone().snapshot();
        assert_eq!(snap.remediations_completed, 2);
        assert_eq!(snap.findings_resolved, 1);
        assert_eq!(snap.completions_rolled_back, 1);
        assert_eq!(snap.trackers_created, 0);
    }

    #[test]
    fn responses_are_keyed_by_route_and_status() {
        let metrics = ApiMetrics::new();
        metrics.record_response("GET /v1/scorecard".into(), StatusCode::OK);
        metrics.record_response("GET /v1/scorecard".into(), StatusCode::OK);
        metrics.record_response("GET /v1/scorecard".into(), StatusCode::UNPROCESSABLE_ENTITY);
        metrics.record_response(UNMATCHED_ROUTE.into(), StatusCode::NOT_FOUND);

        assert_eq!(metrics.responses("GET /v1/scorecard", StatusCode::OK), 2);
        assert_eq!(metrics.responses("GET /v1/gap-analysis", StatusCode::OK), 0);
        assert_eq!(metrics.requests(), 4);
        assert_eq!(metrics.errors(), 2);
        assert_eq!(metrics.snapshot().responses.len(), 3);
    }
}
