//! # Identifier Newtypes
//!
//! Newtype wrappers for every record identifier. They prevent identifier
//! confusion at compile time: a `ControlId` cannot stand in for a
//! `RequirementId`, and a `FindingId` cannot be passed where a `TrackerId`
//! is expected.
//!
//! All identifiers serialize transparently as UUID strings and parse from
//! strings with [`std::str::FromStr`], rejecting malformed input as
//! [`GrcError::Validation`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GrcError;

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = GrcError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self).map_err(|e| {
                    GrcError::Validation(format!(concat!("invalid ", $label, " {:?}: {}"), s, e))
                })
            }
        }
    };
}

uuid_newtype!(
    /// Identifier of a compliance framework (e.g. ISO 27001, SOC 2).
    FrameworkId,
    "framework id"
);
uuid_newtype!(
    /// Identifier of a single framework requirement.
    RequirementId,
    "requirement id"
);
uuid_newtype!(
    /// Identifier of a unified control in the control library.
    ControlId,
    "control id"
);
uuid_newtype!(
    /// Identifier of a requirement-to-control mapping.
    MappingId,
    "mapping id"
);
uuid_newtype!(
    /// Identifier of an assessment.
    AssessmentId,
    "assessment id"
);
uuid_newtype!(
    /// Identifier of a per-control assessment result.
    AssessmentResultId,
    "assessment result id"
);
uuid_newtype!(
    /// Identifier of an audit or assessment finding.
    FindingId,
    "finding id"
);
uuid_newtype!(
    /// Identifier of a remediation tracker.
    TrackerId,
    "tracker id"
);
