//! # grc-remediation — Remediation Status Engine
//!
//! The only part of the posture engine that writes.
//!
//! - **Service** (`service.rs`): tracker create / update / complete and the
//!   per-finding listing. Completion and the finding cascade run in one
//!   store transaction.
//! - **Dashboard** (`dashboard.rs`): SLA buckets, upcoming deadlines, and
//!   trailing 90-day completion metrics computed over open trackers.
//! - **View** (`view.rs`): the tracker representation returned by every
//!   operation, carrying the derived status and days until due.

pub mod dashboard;
pub mod service;
pub mod view;

pub use dashboard::{build_dashboard, RemediationDashboard};
pub use service::{CompletionOutcome, RemediationService};
pub use view::TrackerView;
