//! # grc-store — Collaborator Ports and Adapters
//!
//! The posture engines never talk to persistence directly. They consume two
//! narrow ports:
//!
//! - [`ControlLibrary`]: read-only access to frameworks, requirements,
//!   controls, mappings, assessments, and assessment results.
//! - [`RemediationStore`]: findings and remediation trackers, including the
//!   one transactional write path (tracker completion + finding cascade).
//!
//! ## Architecture
//!
//! ```text
//! grc-store (ports)  -->  query (pre-joined views)  -->  grc-scoring / grc-remediation
//!   ControlLibrary          FrameworkView                  pure aggregation
//!   RemediationStore        RequirementCoverage
//!   MemoryStore (adapter)
//! ```
//!
//! [`MemoryStore`] implements both ports in process. It is what the API and
//! CLI binaries run on, seeded from a [`Snapshot`] file.

pub mod memory;
pub mod ports;
pub mod query;
pub mod snapshot;

pub use memory::MemoryStore;
pub use ports::{
    ControlLibrary, MappingRecord, RemediationStore, RemediationTx, RequirementFilter,
    StoreResult,
};
pub use query::{
    assessment_view, framework_view, requirement_coverage, AssessmentView, FrameworkView,
    RequirementCoverage, RequirementMappings, ResolvedMapping,
};
pub use snapshot::{Snapshot, SnapshotError};
