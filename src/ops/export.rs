use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::io::atomic::atomic_write;
use crate::model::project::Workspace;
use crate::model::task::TaskRecord;

/// Error type for export encoding and writing
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("invalid CSV delimiter {0:?} (must be a single ASCII character)")]
    InvalidDelimiter(char),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("encoded output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Output formats for task exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Yaml,
    Md,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Csv,
        ExportFormat::Json,
        ExportFormat::Yaml,
        ExportFormat::Md,
        ExportFormat::Html,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
            ExportFormat::Md => "md",
            ExportFormat::Html => "html",
        }
    }

    /// `exported_tasks.<ext>`
    pub fn file_name(self) -> String {
        format!("exported_tasks.{}", self.extension())
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            "md" | "markdown" => Ok(ExportFormat::Md),
            "html" => Ok(ExportFormat::Html),
            _ => Err(format!(
                "unknown export format '{}' (expected: csv, json, yaml, md, html)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// CSV field delimiter
    pub delimiter: char,
    /// Remove `@tag` tokens from task text (tags are still listed separately)
    pub strip_tags: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            delimiter: ',',
            strip_tags: false,
        }
    }
}

/// Row shape shared by the structured encoders
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: usize,
    task: String,
    tags: &'a [String],
    status: &'static str,
}

fn rows<'a>(tasks: &[(usize, &'a TaskRecord)], options: &ExportOptions) -> Vec<ExportRow<'a>> {
    tasks
        .iter()
        .map(|&(id, task)| ExportRow {
            id,
            task: display_text(task, options),
            tags: &task.tags,
            status: task.status.label(),
        })
        .collect()
}

fn display_text(task: &TaskRecord, options: &ExportOptions) -> String {
    if options.strip_tags {
        task.text_without_tags()
    } else {
        task.text.clone()
    }
}

// ---------------------------------------------------------------------------
// Encoders
// ---------------------------------------------------------------------------

/// Encode tasks, given with their display indices, into `format`.
pub fn encode(
    tasks: &[(usize, &TaskRecord)],
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => encode_csv(tasks, options),
        ExportFormat::Json => {
            let mut out = serde_json::to_string_pretty(&rows(tasks, options))?;
            out.push('\n');
            Ok(out)
        }
        ExportFormat::Yaml => Ok(serde_yaml::to_string(&rows(tasks, options))?),
        ExportFormat::Md => Ok(encode_markdown(tasks, options)),
        ExportFormat::Html => Ok(encode_html(tasks, options)),
    }
}

/// `ID,Task,Tags,Status` with tags joined by ` | `
fn encode_csv(
    tasks: &[(usize, &TaskRecord)],
    options: &ExportOptions,
) -> Result<String, ExportError> {
    let delimiter = csv_delimiter(options.delimiter)?;
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(["ID", "Task", "Tags", "Status"])?;
    for row in rows(tasks, options) {
        wtr.write_record([
            row.id.to_string(),
            row.task,
            row.tags.join(" | "),
            row.status.to_string(),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

fn csv_delimiter(c: char) -> Result<u8, ExportError> {
    if !c.is_ascii() || matches!(c, '"' | '\n' | '\r') {
        return Err(ExportError::InvalidDelimiter(c));
    }
    Ok(c as u8)
}

/// One list item per task line
fn encode_markdown(tasks: &[(usize, &TaskRecord)], options: &ExportOptions) -> String {
    let mut out = String::new();
    for (_, task) in tasks {
        out.push_str(&format!(
            "- {} {}\n",
            task.status.marker(),
            display_text(task, options)
        ));
    }
    out
}

/// A standalone page with one checkbox and one tag container per task
fn encode_html(tasks: &[(usize, &TaskRecord)], options: &ExportOptions) -> String {
    let mut out = String::from(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Tasks</title>\n\
         </head>\n\
         <body>\n\
         <ul class=\"tasks\">\n",
    );
    for (id, task) in tasks {
        let checked = if task.is_complete() { " checked" } else { "" };
        out.push_str(&format!(
            "  <li class=\"task {}\">\n",
            task.status.label()
        ));
        out.push_str(&format!(
            "    <input type=\"checkbox\" id=\"task-{id}\" disabled{checked}>\n    <label for=\"task-{id}\">{}</label>\n",
            escape_html(&display_text(task, options))
        ));
        out.push_str("    <div class=\"tags\">");
        for tag in &task.tags {
            out.push_str(&format!("<span class=\"tag\">{}</span>", escape_html(tag)));
        }
        out.push_str("</div>\n  </li>\n");
    }
    out.push_str("</ul>\n</body>\n</html>\n");
    out
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Result of exporting one format
#[derive(Debug)]
pub struct ExportOutcome {
    pub format: ExportFormat,
    pub result: Result<PathBuf, ExportError>,
}

/// Encode `tasks` into each format and write `<project>/exports/exported_tasks.<ext>`,
/// creating the exports folder if needed. Each format succeeds or fails on its own.
pub fn export_tasks(
    ws: &Workspace,
    project: &str,
    tasks: &[(usize, &TaskRecord)],
    formats: &[ExportFormat],
    options: &ExportOptions,
) -> Vec<ExportOutcome> {
    let dir = ws.exports_dir(project);
    formats
        .iter()
        .map(|&format| {
            let result = encode(tasks, format, options).and_then(|content| {
                fs::create_dir_all(&dir).map_err(|e| ExportError::Write {
                    path: dir.clone(),
                    source: e,
                })?;
                let path = dir.join(format.file_name());
                atomic_write(&path, content.as_bytes()).map_err(|e| ExportError::Write {
                    path: path.clone(),
                    source: e,
                })?;
                Ok(path)
            });
            match &result {
                Ok(path) => tracing::info!(%project, %format, path = %path.display(), "tasks exported"),
                Err(e) => tracing::warn!(%project, %format, error = %e, "export failed"),
            }
            ExportOutcome { format, result }
        })
        .collect()
}
