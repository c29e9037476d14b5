//! # Snapshot Files
//!
//! A snapshot is the full contents of a [`MemoryStore`](crate::MemoryStore)
//! as one serde document. The API and CLI binaries seed their store from one.
//! Format is chosen by extension: `.yaml`/`.yml` is YAML, anything else JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use grc_core::{
    Assessment, AssessmentResult, Control, Framework, GrcError, Mapping, Requirement,
};
use grc_state::{Finding, RemediationTracker};

/// Errors raised while reading or writing a snapshot file.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML snapshot: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("snapshot rejected: {0}")]
    Invalid(#[from] GrcError),
}

/// Serialized store contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub frameworks: Vec<Framework>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub controls: Vec<Control>,
    #[serde(default)]
    pub mappings: Vec<Mapping>,
    #[serde(default)]
    pub assessments: Vec<Assessment>,
    #[serde(default)]
    pub assessment_results: Vec<AssessmentResult>,
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub trackers: Vec<RemediationTracker>,
}

impl Snapshot {
    /// Read and validate a snapshot file.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot = if is_yaml(path) {
            Self::from_yaml_str(&raw)?
        } else {
            Self::from_json_str(&raw)?
        };
        snapshot.validate()?;
        tracing::info!(
            path = %path.display(),
            frameworks = snapshot.frameworks.len(),
            findings = snapshot.findings.len(),
            trackers = snapshot.trackers.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Write the snapshot to `path`, in the format its extension selects.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let raw = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, raw).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), trackers = self.trackers.len(), "snapshot saved");
        Ok(())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, SnapshotError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Record-level checks: effectiveness ratings in 1..=5, tracker
    /// progress at most 100.
    pub fn validate(&self) -> Result<(), GrcError> {
        for result in &self.assessment_results {
            result.validate()?;
        }
        for tracker in &self.trackers {
            if tracker.progress_percent > 100 {
                return Err(GrcError::Validation(format!(
                    "tracker {} progress_percent {} outside 0..=100",
                    tracker.id, tracker.progress_percent
                )));
            }
        }
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
