use crate::model::{Action, ActionStep, Classification, SkipReason};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Terminal state of one repository within a batch.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    Skipped {
        reason: SkipReason,
    },
    Succeeded {
        action: Action,
    },
    Failed {
        action: Action,
        step: ActionStep,
        error: String,
    },
    /// Dry run: the action that would have been executed.
    Planned {
        action: Action,
    },
    /// Processing stopped on a panic; the repository may be mid-action.
    Aborted {
        error: String,
    },
}

impl SyncOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::Skipped { .. } => "skipped",
            SyncOutcome::Succeeded { .. } => "succeeded",
            SyncOutcome::Failed { .. } => "failed",
            SyncOutcome::Planned { .. } => "planned",
            SyncOutcome::Aborted { .. } => "aborted",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SyncOutcome::Failed { .. } | SyncOutcome::Aborted { .. }
        )
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Skipped { reason } => write!(f, "skipped ({reason})"),
            SyncOutcome::Succeeded { action } => write!(f, "{action} succeeded"),
            SyncOutcome::Failed { step, error, .. } => write!(f, "{step} failed: {error}"),
            SyncOutcome::Planned { action } => write!(f, "would {action}"),
            SyncOutcome::Aborted { error } => write!(f, "aborted: {error}"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub name: String,
    pub path: PathBuf,
    pub classification: Classification,
    pub action: Action,
    pub outcome: SyncOutcome,
    pub detail: String,
}

/// Ordered per-repository results of one pass, plus tallies.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchReport {
    base_dir: PathBuf,
    started_at: String,
    finished_at: String,
    results: Vec<SyncResult>,
    skipped: u32,
    succeeded: u32,
    failed: u32,
    planned: u32,
}

impl BatchReport {
    pub(crate) fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            started_at: now_rfc3339(),
            finished_at: String::new(),
            results: Vec::new(),
            skipped: 0,
            succeeded: 0,
            failed: 0,
            planned: 0,
        }
    }

    pub(crate) fn record(&mut self, result: SyncResult) {
        match result.outcome {
            SyncOutcome::Skipped { .. } => self.skipped += 1,
            SyncOutcome::Succeeded { .. } => self.succeeded += 1,
            SyncOutcome::Failed { .. } | SyncOutcome::Aborted { .. } => self.failed += 1,
            SyncOutcome::Planned { .. } => self.planned += 1,
        }
        self.results.push(result);
    }

    /// A finished report over already collected results, in the given order.
    pub fn from_results(base_dir: &Path, results: impl IntoIterator<Item = SyncResult>) -> Self {
        let mut report = Self::new(base_dir);
        for result in results {
            report.record(result);
        }
        report.finish()
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = now_rfc3339();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn started_at(&self) -> &str {
        &self.started_at
    }

    pub fn finished_at(&self) -> &str {
        &self.finished_at
    }

    pub fn results(&self) -> &[SyncResult] {
        &self.results
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    pub fn succeeded(&self) -> u32 {
        self.succeeded
    }

    pub fn failed(&self) -> u32 {
        self.failed
    }

    pub fn planned(&self) -> u32 {
        self.planned
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncResult> {
        self.results
            .iter()
            .filter(|result| result.outcome.is_failure())
    }
}

fn now_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
