use super::*;
use colored::{ColoredString, Colorize};
use reposync_core::{Repository, SyncEvent, SyncOutcome, SyncResult};

pub(in crate::cli) fn render_progress_line(progress: &SyncProgress) -> Option<String> {
    let repo = progress.repo_name.as_deref().unwrap_or("-");
    let tag = format!("[{repo}]");
    let line = match &progress.event {
        SyncEvent::Discovered => format!(
            "Discovered {} {}",
            progress.total_repos,
            plural(progress.total_repos, "repository", "repositories")
        ),
        SyncEvent::Inspecting => format!("{tag} fetching and inspecting..."),
        SyncEvent::Classified {
            classification,
            action,
        } => format!("{tag} {classification} -> {action}"),
        SyncEvent::Pushing => format!("{tag} pushing..."),
        SyncEvent::Pulling => format!("{tag} pulling with rebase..."),
        SyncEvent::Finished { result } => format!(
            "{tag} {} ({}/{})",
            outcome_label(&result.outcome),
            progress.processed_repos,
            progress.total_repos
        ),
        SyncEvent::Done => return None,
    };
    Some(line)
}

pub(in crate::cli) fn outcome_label(outcome: &SyncOutcome) -> ColoredString {
    let text = outcome.to_string();
    match outcome {
        SyncOutcome::Succeeded { .. } => text.green(),
        SyncOutcome::Skipped { .. } => text.yellow(),
        SyncOutcome::Failed { .. } | SyncOutcome::Aborted { .. } => text.red().bold(),
        SyncOutcome::Planned { .. } => text.cyan(),
    }
}

fn status_marker(outcome: &SyncOutcome) -> ColoredString {
    match outcome {
        SyncOutcome::Succeeded { .. } => "ok".green(),
        SyncOutcome::Skipped { .. } => "skip".yellow(),
        SyncOutcome::Failed { .. } | SyncOutcome::Aborted { .. } => "FAIL".red().bold(),
        SyncOutcome::Planned { .. } => "plan".cyan(),
    }
}

pub(in crate::cli) fn render_result_line(result: &SyncResult, name_width: usize) -> String {
    // Failures carry the step that broke, e.g. "pull failed: <stderr>".
    let detail = if result.outcome.is_failure() {
        result.outcome.to_string()
    } else {
        result.detail.clone()
    };
    format!(
        "{:<4} {:<name_width$}  {:<18} {:<26} {}",
        status_marker(&result.outcome),
        result.name,
        result.classification.to_string(),
        result.action.to_string(),
        detail
    )
}

pub(in crate::cli) fn render_summary(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} discovered in {}",
        report.total(),
        plural(report.total(), "repository", "repositories"),
        report.base_dir().display()
    )];
    let name_width = report
        .results()
        .iter()
        .map(|result| result.name.len())
        .max()
        .unwrap_or(0);
    for result in report.results() {
        lines.push(render_result_line(result, name_width));
    }

    let mut counts = format!(
        "skipped={} succeeded={} failed={}",
        report.skipped(),
        report.succeeded(),
        report.failed()
    );
    if report.planned() > 0 {
        counts.push_str(&format!(" planned={}", report.planned()));
    }
    lines.push(if report.has_failures() {
        counts.red().bold().to_string()
    } else {
        counts.green().to_string()
    });
    lines
}

pub(in crate::cli) fn print_summary(report: &BatchReport) {
    println!();
    for line in render_summary(report) {
        println!("{line}");
    }
}

pub(in crate::cli) fn render_repository_line(repo: &Repository) -> String {
    let upstream = if repo.has_upstream {
        "upstream".green()
    } else {
        "no upstream".yellow()
    };
    format!("{}  {}  {}", repo.name(), upstream, repo.path().display())
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
