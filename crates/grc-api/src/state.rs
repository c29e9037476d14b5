//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Every engine reads and writes the same [`MemoryStore`] and sees the same
//! [`Clock`]. Handlers never hold a store lock across an `.await`: engine
//! calls are synchronous and complete before the handler returns.

use std::sync::Arc;

use grc_core::Clock;
use grc_remediation::RemediationService;
use grc_scoring::{GapAnalyzer, ScorecardAggregator};
use grc_store::MemoryStore;

use crate::middleware::metrics::ApiMetrics;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub scorecards: Arc<ScorecardAggregator<MemoryStore>>,
    pub gaps: Arc<GapAnalyzer<MemoryStore>>,
    pub remediation: Arc<RemediationService<MemoryStore>>,
    pub metrics: ApiMetrics,
}

impl AppState {
    /// Wire every engine to `store` and `clock`.
    pub fn new(store: Arc<MemoryStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scorecards: Arc::new(ScorecardAggregator::new(store.clone(), clock.clone())),
            gaps: Arc::new(GapAnalyzer::new(store.clone(), clock.clone())),
            remediation: Arc::new(RemediationService::new(store.clone(), clock)),
            store,
            metrics: ApiMetrics::new(),
        }
    }
}
