use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::io::atomic::{self, LineEdit, UpdateError};
use crate::model::store::TaskStore;
use crate::model::task::{TaskRecord, TaskStatus};
use crate::parse::{parse_line, parse_tasks, serialize_record, tag_tokens};

/// Error type for task file loading and mutation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    FileIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no task #{index} ({count} tasks in list)")]
    InvalidIndex { index: usize, count: usize },
    #[error("invalid task text: {0}")]
    InvalidText(String),
    #[error(transparent)]
    Update(#[from] UpdateError),
}

/// Load a task file. Every line is kept; only `[ ]`/`[x]` lines are tasks.
pub fn load_store(path: &Path) -> Result<TaskStore, StoreError> {
    let content = fs::read_to_string(path).map_err(|e| StoreError::FileIo {
        path: path.to_path_buf(),
        source: e,
    })?;
    let store = TaskStore::new(path.to_path_buf(), parse_tasks(&content));
    tracing::debug!(path = %path.display(), tasks = store.len(), "loaded task file");
    Ok(store)
}

// ---------------------------------------------------------------------------
// Mutations
//
// Each one re-reads the file, validates indices against what it finds, and
// hands a line transform to the atomic updater. Indices are 1-based display
// indices over task lines; non-task lines always pass through untouched.
// ---------------------------------------------------------------------------

/// Append a task at the end of the file.
/// Returns the new task's display index and the record.
pub fn append_task(
    path: &Path,
    text: &str,
    status: TaskStatus,
) -> Result<(usize, TaskRecord), StoreError> {
    validate_text(text)?;
    let count = load_store(path)?.len();
    let task = TaskRecord::new(status, text);
    atomic::append_line(path, &serialize_record(&task))?;
    tracing::info!(path = %path.display(), index = count + 1, "task added");
    Ok((count + 1, task))
}

/// Set the status of each selected task, keeping its text byte-for-byte.
/// Returns the updated records.
pub fn set_status(
    path: &Path,
    indices: &[usize],
    status: TaskStatus,
) -> Result<Vec<TaskRecord>, StoreError> {
    let selected = check_indices(path, indices)?;
    let mut updated = Vec::new();
    rewrite_selected(path, &selected, |line, task| {
        let new_line = format!("{}{}", status.marker(), &line[3..]);
        updated.push(TaskRecord { status, ..task });
        LineEdit::Rewrite(new_line)
    })?;
    tracing::info!(path = %path.display(), count = updated.len(), %status, "status changed");
    Ok(updated)
}

/// Replace the text of one task, keeping its status.
pub fn edit_task(path: &Path, index: usize, new_text: &str) -> Result<TaskRecord, StoreError> {
    validate_text(new_text)?;
    let selected = check_indices(path, &[index])?;
    let mut edited = None;
    rewrite_selected(path, &selected, |_, task| {
        let record = TaskRecord::new(task.status, new_text);
        let new_line = serialize_record(&record).trim_end_matches('\n').to_string();
        edited = Some(record);
        LineEdit::Rewrite(new_line)
    })?;
    tracing::info!(path = %path.display(), index, "task edited");
    edited.ok_or(StoreError::InvalidIndex { index, count: 0 })
}

/// Remove the selected tasks. An empty selection leaves the file untouched.
/// Returns the removed records in file order.
pub fn delete_tasks(path: &Path, indices: &[usize]) -> Result<Vec<TaskRecord>, StoreError> {
    if indices.is_empty() {
        return Ok(Vec::new());
    }
    let selected = check_indices(path, indices)?;
    let mut removed = Vec::new();
    rewrite_selected(path, &selected, |_, task| {
        removed.push(task);
        LineEdit::Omit
    })?;
    tracing::info!(path = %path.display(), count = removed.len(), "tasks deleted");
    Ok(removed)
}

/// Append `@tag` tokens, built from a comma-separated list, to each selected
/// task. Existing tags are not checked for duplicates.
pub fn add_tags(
    path: &Path,
    indices: &[usize],
    tags: &str,
) -> Result<Vec<TaskRecord>, StoreError> {
    let tokens = tag_tokens(tags);
    if tokens.is_empty() {
        return Err(StoreError::InvalidText("no tags given".to_string()));
    }
    let suffix = tokens.join(" ");
    let selected = check_indices(path, indices)?;
    let mut updated = Vec::new();
    rewrite_selected(path, &selected, |line, task| {
        let new_line = format!("{} {}", line.trim_end(), suffix);
        let text = format!("{} {}", task.text.trim_end(), suffix);
        updated.push(TaskRecord::new(task.status, text));
        LineEdit::Rewrite(new_line)
    })?;
    tracing::info!(path = %path.display(), count = updated.len(), tags = %suffix, "tags added");
    Ok(updated)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reject text that cannot live on a single task line
fn validate_text(text: &str) -> Result<(), StoreError> {
    if text.trim().is_empty() {
        return Err(StoreError::InvalidText("task text cannot be empty".into()));
    }
    if text.contains(['\n', '\r']) {
        return Err(StoreError::InvalidText(
            "task text cannot contain line breaks".into(),
        ));
    }
    Ok(())
}

/// Load the file and check every index against its current task count.
fn check_indices(path: &Path, indices: &[usize]) -> Result<BTreeSet<usize>, StoreError> {
    let count = load_store(path)?.len();
    let mut selected = BTreeSet::new();
    for &index in indices {
        if index == 0 || index > count {
            return Err(StoreError::InvalidIndex { index, count });
        }
        selected.insert(index);
    }
    Ok(selected)
}

/// Rewrite `path`, calling `edit` with the raw line and parsed record of each
/// selected task. All other lines are kept verbatim.
fn rewrite_selected<F>(path: &Path, selected: &BTreeSet<usize>, mut edit: F) -> Result<(), StoreError>
where
    F: FnMut(&str, TaskRecord) -> LineEdit,
{
    let mut display_index = 0;
    atomic::rewrite_lines(path, |_, line| -> Result<LineEdit, StoreError> {
        let Some(task) = parse_line(line) else {
            return Ok(LineEdit::Keep);
        };
        display_index += 1;
        if selected.contains(&display_index) {
            Ok(edit(line, task))
        } else {
            Ok(LineEdit::Keep)
        }
    })?;
    Ok(())
}
