//! # grc-core — Foundational Types for the GRC Posture Engine
//!
//! This crate is the leaf of the workspace dependency graph. It defines the
//! primitives every other crate builds on:
//!
//! 1. **Newtype identifiers.** `FrameworkId`, `RequirementId`, `ControlId`,
//!    `FindingId`, `TrackerId` and friends wrap a `Uuid`. A `ControlId` cannot
//!    be passed where a `RequirementId` is expected.
//!
//! 2. **Control-library records.** `Framework`, `Requirement`, `Control`,
//!    `Mapping`, `Assessment`, `AssessmentResult` are read-only snapshots owned
//!    by external control-library services.
//!
//! 3. **One error taxonomy.** [`GrcError`] carries the NotFound / Validation /
//!    InvalidTransition / Storage split used by every engine.
//!
//! 4. **Injected time.** Engine code reads the current instant through
//!    [`Clock`], never through `Utc::now()` directly.
//!
//! 5. **Guarded arithmetic.** All percentages go through [`percent::percentage`],
//!    which returns 0 for an empty denominator.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `grc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod library;
pub mod percent;
pub mod temporal;

pub use error::GrcError;
pub use identity::{
    AssessmentId, AssessmentResultId, ControlId, FindingId, FrameworkId, MappingId,
    RequirementId, TrackerId,
};
pub use library::{
    Assessment, AssessmentResult, AssessmentStatus, Control, CoverageLevel, Framework,
    ImplementationStatus, Mapping, Priority, Requirement,
};
pub use temporal::{Clock, FixedClock, SystemClock};
