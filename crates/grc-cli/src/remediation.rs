//! # Remediation Subcommand
//!
//! `grc remediation dashboard | list | create | update | complete`.
//!
//! Read actions only print. Write actions go through the remediation
//! service and then save the store back to the snapshot file; a rejected
//! write leaves the file untouched.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use grc_core::{FindingId, TrackerId};
use grc_remediation::RemediationService;
use grc_state::{CompletionDetails, NewTracker, RemediationPriority, TrackerUpdate};

use crate::Session;

/// Arguments for `grc remediation`.
#[derive(Args, Debug)]
pub struct RemediationArgs {
    #[command(subcommand)]
    pub action: RemediationAction,
}

#[derive(Subcommand, Debug)]
pub enum RemediationAction {
    /// SLA dashboard as of today.
    Dashboard,

    /// Every tracker of a finding.
    List {
        #[arg(value_name = "FINDING_ID")]
        finding: FindingId,
    },

    /// Open a tracker against a finding.
    Create {
        #[arg(value_name = "FINDING_ID")]
        finding: FindingId,

        /// SLA due date (YYYY-MM-DD).
        #[arg(long)]
        due: NaiveDate,

        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,

        #[arg(long)]
        steps: Option<String>,

        #[arg(long)]
        assigned_to: Option<String>,
    },

    /// Edit an open tracker.
    Update {
        #[arg(value_name = "TRACKER_ID")]
        tracker: TrackerId,

        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,

        /// Progress percentage, 0-100.
        #[arg(long, allow_negative_numbers = true)]
        progress: Option<i64>,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        steps: Option<String>,

        #[arg(long)]
        assigned_to: Option<String>,
    },

    /// Complete a tracker, resolving its finding when it was the last one open.
    Complete {
        #[arg(value_name = "TRACKER_ID")]
        tracker: TrackerId,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        evidence: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    Critical,
    High,
    Medium,
    Low,
}

impl From<PriorityArg> for RemediationPriority {
    fn from(p: PriorityArg) -> Self {
        match p {
            PriorityArg::Critical => Self::Critical,
            PriorityArg::High => Self::High,
            PriorityArg::Medium => Self::Medium,
            PriorityArg::Low => Self::Low,
        }
    }
}

/// Execute `grc remediation`.
pub fn run_remediation(args: &RemediationArgs, session: &Session, out: &mut dyn Write) -> Result<u8> {
    let service = RemediationService::new(session.store.clone(), session.clock.clone());

    match &args.action {
        RemediationAction::Dashboard => session.emit(&service.dashboard()?, out)?,
        RemediationAction::List { finding } => {
            session.emit(&service.get_trackers_by_finding(*finding)?, out)?
        }
        RemediationAction::Create {
            finding,
            due,
            priority,
            steps,
            assigned_to,
        } => {
            let view = service.create_tracker(
                *finding,
                NewTracker {
                    priority: priority.map(Into::into),
                    sla_due_date: *due,
                    remediation_steps: steps.clone(),
                    assigned_to: assigned_to.clone(),
                },
            )?;
            session.persist()?;
            session.emit(&view, out)?;
        }
        RemediationAction::Update {
            tracker,
            priority,
            progress,
            notes,
            steps,
            assigned_to,
        } => {
            let view = service.update_tracker(
                *tracker,
                TrackerUpdate {
                    priority: priority.map(Into::into),
                    progress_percent: *progress,
                    progress_notes: notes.clone(),
                    remediation_steps: steps.clone(),
                    assigned_to: assigned_to.clone(),
                },
            )?;
            session.persist()?;
            session.emit(&view, out)?;
        }
        RemediationAction::Complete {
            tracker,
            notes,
            evidence,
        } => {
            let outcome = service.complete_remediation(
                *tracker,
                CompletionDetails {
                    completion_notes: notes.clone(),
                    completion_evidence: evidence.clone(),
                },
            )?;
            session.persist()?;
            session.emit(&outcome, out)?;
        }
    }
    Ok(0)
}
