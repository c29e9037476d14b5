//! # grc-state — Finding and Remediation Lifecycles
//!
//! Implements the two aggregates the posture engine is allowed to write.
//!
//! ## State Machines
//!
//! - **Finding** (`finding.rs`): `Open → InProgress → Resolved` plus the
//!   closing branches (`Closed`, `RiskAccepted`, `FalsePositive`). The
//!   remediation cascade only ever performs `InProgress → Resolved`.
//!
//! - **Remediation tracker** (`tracker.rs`): freely editable while open,
//!   then a single terminal completion that freezes `sla_met` and
//!   `days_to_completion`.
//!
//! - **Remediation status** (`status.rs`): the derived, never-stored
//!   `on_track / at_risk / overdue / completed` classification.

pub mod finding;
pub mod status;
pub mod tracker;

pub use finding::{Finding, FindingError, FindingSeverity, FindingStatus};
pub use status::{RemediationStatus, AT_RISK_WINDOW_DAYS};
pub use tracker::{
    CompletionDetails, NewTracker, RemediationPriority, RemediationTracker, TrackerError,
    TrackerUpdate,
};
