use serde::Serialize;

use crate::model::store::StatusCounts;
use crate::model::task::{TaskRecord, TaskStatus};
use crate::ops::report::ProjectReport;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub index: usize,
    pub status: TaskStatus,
    pub text: String,
    pub tags: Vec<String>,
}

#[derive(Serialize)]
pub struct ProgressJson {
    pub pending: usize,
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub project: String,
    pub file: String,
    pub tasks: Vec<TaskJson>,
    pub progress: ProgressJson,
}

#[derive(Serialize)]
pub struct ReportJson<'a> {
    pub projects: Vec<ProjectReportJson<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ProjectErrorJson>,
}

#[derive(Serialize)]
pub struct ProjectReportJson<'a> {
    #[serde(flatten)]
    pub report: &'a ProjectReport,
    pub percentage: u32,
}

#[derive(Serialize)]
pub struct ProjectErrorJson {
    pub project: String,
    pub error: String,
}

/// Per-target outcome of generate/export/report writes
#[derive(Serialize)]
pub struct OutcomeJson {
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(index: usize, task: &TaskRecord, strip_tags: bool) -> TaskJson {
    TaskJson {
        index,
        status: task.status,
        text: task_text(task, strip_tags),
        tags: task.tags.clone(),
    }
}

pub fn progress_to_json(counts: &StatusCounts) -> ProgressJson {
    ProgressJson {
        pending: counts.pending,
        completed: counts.completed,
        total: counts.total,
        percentage: counts.percentage(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn task_text(task: &TaskRecord, strip_tags: bool) -> String {
    if strip_tags {
        task.text_without_tags()
    } else {
        task.text.clone()
    }
}

/// `3. [x] call mom @family`
pub fn format_task_line(index: usize, task: &TaskRecord, strip_tags: bool) -> String {
    format!(
        "{}. {} {}",
        index,
        task.status.marker(),
        task_text(task, strip_tags)
    )
}

/// `[█████-----] 50% (1/2)`
pub fn format_progress(counts: &StatusCounts) -> String {
    format!(
        "{} {}% ({}/{})",
        counts.bar(),
        counts.percentage(),
        counts.completed,
        counts.total
    )
}

/// One report row: `  1  api  [█████-----] 50% (1/2)`
pub fn format_report_line(report: &ProjectReport, name_width: usize) -> String {
    format!(
        "{:>3}  {:<width$}  {}",
        report.id,
        report.project,
        format_progress(&report.counts()),
        width = name_width
    )
}

/// Parse a comma-separated format list, dropping empty entries
pub fn split_list(s: &str) -> Vec<&str> {
    s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}
