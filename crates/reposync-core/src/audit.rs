use crate::config::default_audit_dir;
use crate::report::{BatchReport, SyncOutcome, SyncResult};
use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

const MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Append-only JSON-lines log of sync runs, one file per day.
#[derive(Clone)]
pub struct AuditLogger {
    session_id: String,
    base_dir: PathBuf,
    max_bytes: u64,
}

impl AuditLogger {
    pub fn new() -> anyhow::Result<Self> {
        Self::new_with_dir(default_audit_dir()?, MAX_BYTES)
    }

    pub fn new_with_dir(base_dir: PathBuf, max_bytes: u64) -> anyhow::Result<Self> {
        fs::create_dir_all(&base_dir).context("create audit dir")?;
        Ok(Self {
            session_id: Uuid::new_v4().to_string(),
            base_dir,
            max_bytes,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn record(
        &self,
        event: &str,
        status: AuditStatus,
        repo: Option<&SyncResult>,
        details: Option<Value>,
        error: Option<&str>,
    ) -> anyhow::Result<String> {
        let ts = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .context("format timestamp")?;
        let audit_id = Uuid::new_v4().to_string();
        let entry = AuditEvent {
            ts,
            level: status.level(),
            event: event.to_string(),
            audit_id: audit_id.clone(),
            session_id: self.session_id.clone(),
            status: status.as_str(),
            repo: repo.map(|result| result.name.clone()),
            path: repo.map(|result| result.path.display().to_string()),
            error: error.map(|value| value.to_string()),
            details,
        };
        self.write_entry(&entry)?;
        Ok(audit_id)
    }

    /// Records the batch totals as `sync.run` and, when `per_repo` is set,
    /// one `sync.repo` entry per result. Returns the run's audit id.
    pub fn record_report(&self, report: &BatchReport, per_repo: bool) -> anyhow::Result<String> {
        if per_repo {
            for result in report.results() {
                let (status, error) = match &result.outcome {
                    SyncOutcome::Failed { error, .. } | SyncOutcome::Aborted { error } => {
                        (AuditStatus::Failed, Some(error.as_str()))
                    }
                    SyncOutcome::Skipped { .. } => (AuditStatus::Skipped, None),
                    SyncOutcome::Succeeded { .. } | SyncOutcome::Planned { .. } => {
                        (AuditStatus::Ok, None)
                    }
                };
                let details = serde_json::json!({
                    "classification": result.classification,
                    "action": result.action,
                    "outcome": result.outcome,
                    "detail": result.detail,
                });
                self.record("sync.repo", status, Some(result), Some(details), error)?;
            }
        }

        let status = if report.has_failures() {
            AuditStatus::Failed
        } else {
            AuditStatus::Ok
        };
        let totals = serde_json::json!({
            "base_dir": report.base_dir().display().to_string(),
            "started_at": report.started_at(),
            "finished_at": report.finished_at(),
            "repos": report.total(),
            "skipped": report.skipped(),
            "succeeded": report.succeeded(),
            "failed": report.failed(),
            "planned": report.planned(),
        });
        self.record("sync.run", status, None, Some(totals), None)
    }

    fn write_entry(&self, entry: &AuditEvent) -> anyhow::Result<()> {
        let date = OffsetDateTime::now_utc()
            .format(&time::format_description::parse("[year][month][day]")?)
            .context("format date")?;
        let path = next_audit_path(&self.base_dir, &date, self.max_bytes);
        let line = serde_json::to_string(entry).context("serialize audit entry")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open audit log {}", path.display()))?;
        writeln!(file, "{line}").context("write audit entry")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum AuditStatus {
    Ok,
    Failed,
    Skipped,
}

impl AuditStatus {
    fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Ok => "ok",
            AuditStatus::Failed => "failed",
            AuditStatus::Skipped => "skipped",
        }
    }

    fn level(&self) -> &'static str {
        match self {
            AuditStatus::Ok => "INFO",
            AuditStatus::Failed => "ERROR",
            AuditStatus::Skipped => "WARN",
        }
    }
}

#[derive(Serialize)]
struct AuditEvent {
    ts: String,
    level: &'static str,
    event: String,
    audit_id: String,
    session_id: String,
    status: &'static str,
    repo: Option<String>,
    path: Option<String>,
    error: Option<String>,
    details: Option<Value>,
}

fn next_audit_path(base_dir: &Path, date: &str, max_bytes: u64) -> PathBuf {
    let mut suffix = 0;
    loop {
        let name = if suffix == 0 {
            format!("audit-{date}.jsonl")
        } else {
            format!("audit-{date}-{suffix}.jsonl")
        };
        let path = base_dir.join(name);
        if let Ok(metadata) = fs::metadata(&path)
            && metadata.len() >= max_bytes
        {
            suffix += 1;
            continue;
        }
        return path;
    }
}
