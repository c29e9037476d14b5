//! # grc-cli — Command-Line Posture Reports
//!
//! Provides the `grc` command-line interface over a snapshot file.
//!
//! ## Subcommands
//!
//! - `grc scorecard` — compliance scorecard, optionally failing under a threshold.
//! - `grc gaps` — gap analysis with domain / category / priority filters.
//! - `grc remediation` — SLA dashboard and tracker create / update / complete.
//!
//! Reports are written to stdout as JSON (default) or YAML. Tracker writes
//! are saved back to the snapshot file.
//!
//! ```bash
//! grc --snapshot posture.yaml --today 2026-06-30 scorecard --fail-under 80
//! grc --snapshot posture.yaml gaps --priority-only
//! grc --snapshot posture.yaml remediation complete <TRACKER_ID> --evidence JIRA-12
//! ```

pub mod posture;
pub mod remediation;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use grc_core::temporal::parse_date;
use grc_core::{Clock, FixedClock, SystemClock};
use grc_store::{MemoryStore, Snapshot};

/// Report serialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// A loaded snapshot plus the clock reports are computed against.
pub struct Session {
    pub snapshot_path: PathBuf,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<dyn Clock>,
    pub format: OutputFormat,
}

impl Session {
    /// Load `snapshot`. `today` (YYYY-MM-DD) pins the clock to midnight UTC
    /// of that date; otherwise the system clock is used.
    pub fn open(snapshot: &Path, today: Option<&str>, format: OutputFormat) -> Result<Self> {
        let clock: Arc<dyn Clock> = match today {
            Some(raw) => Arc::new(FixedClock::at_date(parse_date(raw)?)),
            None => Arc::new(SystemClock),
        };
        let loaded = Snapshot::load(snapshot)
            .with_context(|| format!("failed to load snapshot: {}", snapshot.display()))?;
        let store = MemoryStore::from_snapshot(loaded)?;
        Ok(Self {
            snapshot_path: snapshot.to_path_buf(),
            store: Arc::new(store),
            clock,
            format,
        })
    }

    /// Write the store back to the snapshot file.
    pub fn persist(&self) -> Result<()> {
        self.store
            .snapshot()
            .save(&self.snapshot_path)
            .with_context(|| format!("failed to save snapshot: {}", self.snapshot_path.display()))
    }

    /// Serialize `value` to `out` in the session's format.
    pub fn emit<T: Serialize>(&self, value: &T, out: &mut dyn Write) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, value)?;
                writeln!(out)?;
            }
            OutputFormat::Yaml => {
                out.write_all(serde_yaml::to_string(value)?.as_bytes())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    //! Snapshot fixture shared by the subcommand tests.

    use std::path::PathBuf;

    use tempfile::TempDir;

    /// SOC 2 with one covered and one uncovered requirement, and one
    /// IN_PROGRESS finding.
    pub const SNAPSHOT: &str = r#"
frameworks:
  - id: 5b1f0c1e-3a52-4d9a-9a0e-1f2d3c4b5a60
    name: SOC 2
    code: SOC2
requirements:
  - id: 9d7c2a11-0b6e-4f3e-8c55-7a1b2c3d4e5f
    framework_id: 5b1f0c1e-3a52-4d9a-9a0e-1f2d3c4b5a60
    identifier: CC6.1
    text: Logical access controls
    domain: Access Control
    priority: critical
  - id: 0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d
    framework_id: 5b1f0c1e-3a52-4d9a-9a0e-1f2d3c4b5a60
    identifier: CC7.2
    text: Anomaly monitoring
    domain: Operations
    priority: high
controls:
  - id: 66666666-7777-4888-9999-aaaaaaaaaaaa
    identifier: AC-01
    implementation_status: implemented
mappings:
  - id: 12121212-3434-4565-8787-909090909090
    requirement_id: 9d7c2a11-0b6e-4f3e-8c55-7a1b2c3d4e5f
    control_id: 66666666-7777-4888-9999-aaaaaaaaaaaa
    coverage_level: full
findings:
  - id: 3c3c3c3c-4d4d-4e5e-8f6f-707070707070
    finding_identifier: FND-2026-014
    title: Anomaly alerts unrouted
    severity: high
    status: in_progress
    created_at: 2026-05-01T08:00:00Z
    updated_at: 2026-05-01T08:00:00Z
"#;

    pub const FINDING_ID: &str = "3c3c3c3c-4d4d-4e5e-8f6f-707070707070";

    pub fn snapshot_file() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posture.yaml");
        std::fs::write(&path, SNAPSHOT).unwrap();
        (dir, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_pins_clock_to_today() {
        let (_dir, path) = testutil::snapshot_file();
        let session = Session::open(&path, Some("2026-06-30"), OutputFormat::Json).unwrap();
        assert_eq!(session.clock.today().to_string(), "2026-06-30");
    }

    #[test]
    fn open_rejects_bad_today() {
        let (_dir, path) = testutil::snapshot_file();
        assert!(Session::open(&path, Some("30/06/2026"), OutputFormat::Json).is_err());
    }

    #[test]
    fn open_missing_snapshot_fails() {
        let err = Session::open(Path::new("/nonexistent/p.json"), None, OutputFormat::Json)
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("failed to load snapshot"));
    }

    #[test]
    fn emit_yaml() {
        let (_dir, path) = testutil::snapshot_file();
        let session = Session::open(&path, None, OutputFormat::Yaml).unwrap();
        let mut out = Vec::new();
        session
            .emit(&serde_json::json!({ "total": 3 }), &mut out)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "total: 3\n");
    }
}
