//! # grc-api — Axum API for the GRC Posture Engine
//!
//! A thin HTTP surface over the scoring and remediation engines. Handlers
//! parse input, call one engine operation, and map [`grc_core::GrcError`]
//! through [`AppError`]. No business logic lives here.
//!
//! ## API Surface
//!
//! | Method | Path                                         | Module                 |
//! |--------|----------------------------------------------|------------------------|
//! | GET    | `/v1/scorecard?framework_ids=a,b`            | [`routes::posture`]    |
//! | GET    | `/v1/gap-analysis?framework_ids=&domain=&category=&priority_only=` | [`routes::posture`] |
//! | GET    | `/v1/remediation/dashboard`                  | [`routes::remediation`] |
//! | POST   | `/v1/findings/{finding_id}/trackers`         | [`routes::remediation`] |
//! | GET    | `/v1/findings/{finding_id}/trackers`         | [`routes::remediation`] |
//! | PATCH  | `/v1/remediation/trackers/{tracker_id}`      | [`routes::remediation`] |
//! | POST   | `/v1/remediation/trackers/{tracker_id}/complete` | [`routes::remediation`] |
//! | GET    | `/health/liveness`, `/health/readiness`      | probes                 |
//! | GET    | `/metrics`                                   | [`middleware::metrics`] |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use middleware::metrics::{metrics_middleware, MetricsSnapshot};

pub use config::{ApiConfig, ConfigError};
pub use error::AppError;
pub use state::AppState;

/// Assemble the application router with all routes and middleware.
///
/// Health probes and `/metrics` sit outside the metrics layer.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::posture::router())
        .merge(routes::remediation::router())
        .layer(from_fn_with_state(state.metrics.clone(), metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let ops = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(metrics_snapshot))
        .with_state(state);

    Router::new().merge(ops).merge(api)
}

async fn metrics_snapshot(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn liveness() -> &'static str {
    "ok"
}

async fn readiness() -> &'static str {
    "ready"
}
