use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::io::atomic::atomic_write;
use crate::io::project_io::{self, ProjectError};
use crate::io::store_io::{self, StoreError};
use crate::model::project::Workspace;
use crate::model::store::StatusCounts;
use crate::ops::export::escape_html;

/// Error type for building and writing cross-project reports
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("encoded output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Progress of one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectReport {
    /// 1-based position in the project listing
    pub id: usize,
    pub project: String,
    pub pending: usize,
    pub completed: usize,
    pub total: usize,
}

impl ProjectReport {
    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            pending: self.pending,
            completed: self.completed,
            total: self.total,
        }
    }

    pub fn percentage(&self) -> u32 {
        self.counts().percentage()
    }
}

#[derive(Debug, Default)]
pub struct Summary {
    pub reports: Vec<ProjectReport>,
    /// Projects whose task file could not be found or read
    pub failures: Vec<(String, ReportError)>,
}

/// Count tasks in every project. A project that cannot be read is recorded
/// in `failures` and keeps its id; the rest are still summarized.
pub fn summarize_projects(ws: &Workspace) -> Result<Summary, ProjectError> {
    let mut summary = Summary::default();
    for (i, project) in project_io::list_projects(ws)?.into_iter().enumerate() {
        match count_project(ws, &project) {
            Ok(counts) => summary.reports.push(ProjectReport {
                id: i + 1,
                project,
                pending: counts.pending,
                completed: counts.completed,
                total: counts.total,
            }),
            Err(e) => {
                tracing::warn!(%project, error = %e, "skipping project in report");
                summary.failures.push((project, e));
            }
        }
    }
    Ok(summary)
}

fn count_project(ws: &Workspace, project: &str) -> Result<StatusCounts, ReportError> {
    let path = project_io::task_file(ws, project)?;
    Ok(store_io::load_store(&path)?.count_by_status())
}

// ---------------------------------------------------------------------------
// Report files
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
    Html,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [ReportFormat::Csv, ReportFormat::Json, ReportFormat::Html];

    /// File name under the reports directory
    pub fn file_name(self) -> &'static str {
        match self {
            ReportFormat::Csv => "reports.csv",
            ReportFormat::Json => "reports.json",
            ReportFormat::Html => "reports_table.html",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
        })
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            "html" => Ok(ReportFormat::Html),
            other => Err(format!(
                "unknown report format '{}' (expected: csv, json, html)",
                other
            )),
        }
    }
}

#[derive(Debug)]
pub struct ReportOutcome {
    pub format: ReportFormat,
    pub result: Result<PathBuf, ReportError>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    projects: Vec<JsonRow<'a>>,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    #[serde(flatten)]
    report: &'a ProjectReport,
    percentage: u32,
}

/// Encode the reports in `format`. `generated_at` is only used by JSON.
pub fn encode_report(
    reports: &[ProjectReport],
    format: ReportFormat,
    generated_at: DateTime<Utc>,
) -> Result<String, ReportError> {
    match format {
        ReportFormat::Csv => {
            let mut wtr = csv::WriterBuilder::new()
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(Vec::new());
            wtr.write_record(["ID", "Project", "Pending", "Completed", "Total", "Percentage"])?;
            for r in reports {
                wtr.write_record([
                    r.id.to_string(),
                    r.project.clone(),
                    r.pending.to_string(),
                    r.completed.to_string(),
                    r.total.to_string(),
                    r.percentage().to_string(),
                ])?;
            }
            let bytes = wtr
                .into_inner()
                .map_err(|e| csv::Error::from(e.into_error()))?;
            Ok(String::from_utf8(bytes)?)
        }
        ReportFormat::Json => {
            let doc = JsonReport {
                generated_at,
                projects: reports
                    .iter()
                    .map(|report| JsonRow {
                        report,
                        percentage: report.percentage(),
                    })
                    .collect(),
            };
            let mut out = serde_json::to_string_pretty(&doc)?;
            out.push('\n');
            Ok(out)
        }
        ReportFormat::Html => Ok(encode_html_table(reports)),
    }
}

fn encode_html_table(reports: &[ProjectReport]) -> String {
    let mut out = String::from(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Reports</title>\n\
         </head>\n\
         <body>\n\
         <table>\n\
         <tr><th>ID</th><th>Project</th><th>Progress</th></tr>\n",
    );
    for r in reports {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}% ({}/{})</td></tr>\n",
            r.id,
            escape_html(&r.project),
            r.percentage(),
            r.completed,
            r.total
        ));
    }
    out.push_str("</table>\n</body>\n</html>\n");
    out
}

/// Write each requested report file into the reports directory, creating
/// it if needed. Each format succeeds or fails on its own.
pub fn write_reports(
    ws: &Workspace,
    reports: &[ProjectReport],
    formats: &[ReportFormat],
) -> Vec<ReportOutcome> {
    let dir = ws.reports_dir();
    let generated_at = Utc::now();
    formats
        .iter()
        .map(|&format| {
            let result = encode_report(reports, format, generated_at).and_then(|content| {
                fs::create_dir_all(&dir).map_err(|e| ReportError::Write {
                    path: dir.clone(),
                    source: e,
                })?;
                let path = dir.join(format.file_name());
                atomic_write(&path, content.as_bytes()).map_err(|e| ReportError::Write {
                    path: path.clone(),
                    source: e,
                })?;
                Ok(path)
            });
            match &result {
                Ok(path) => tracing::info!(%format, path = %path.display(), "report written"),
                Err(e) => tracing::warn!(%format, error = %e, "report failed"),
            }
            ReportOutcome { format, result }
        })
        .collect()
}
