use std::path::PathBuf;

use super::task::{TaskRecord, TaskStatus};

/// A line of a task file: either a parsed task or text kept verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLine {
    Task(TaskRecord),
    /// Any line that does not start with a status marker (headers, blanks, notes)
    Other(String),
}

impl StoreLine {
    pub fn as_task(&self) -> Option<&TaskRecord> {
        match self {
            StoreLine::Task(task) => Some(task),
            StoreLine::Other(_) => None,
        }
    }
}

/// Pending/completed tally over the task lines of a file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub completed: usize,
    pub total: usize,
}

impl StatusCounts {
    pub fn add(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::Complete => self.completed += 1,
        }
        self.total += 1;
    }

    /// Completion percentage, ties rounded to even; 0 for an empty list
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.completed as f64 / self.total as f64 * 100.0).round_ties_even() as u32
    }

    /// Filled segments of the 10-segment progress bar
    pub fn filled_segments(&self) -> usize {
        (self.percentage() / 10) as usize
    }

    pub fn empty_segments(&self) -> usize {
        10 - self.filled_segments()
    }

    /// `[█████-----]`
    pub fn bar(&self) -> String {
        format!(
            "[{}{}]",
            "█".repeat(self.filled_segments()),
            "-".repeat(self.empty_segments())
        )
    }
}

/// A project's task list as loaded from disk.
///
/// Built fresh for every view and every mutation; nothing here is written
/// back directly. Mutations go through `io::store_io`, which re-reads the
/// file and replaces it atomically.
#[derive(Debug, Clone)]
pub struct TaskStore {
    /// Task file this store was loaded from
    pub path: PathBuf,
    /// Every line of the file, in file order
    pub lines: Vec<StoreLine>,
}

impl TaskStore {
    pub fn new(path: PathBuf, lines: Vec<StoreLine>) -> Self {
        TaskStore { path, lines }
    }

    /// Tasks with their 1-based display indices, in file order
    pub fn tasks(&self) -> impl Iterator<Item = (usize, &TaskRecord)> {
        self.lines
            .iter()
            .filter_map(StoreLine::as_task)
            .enumerate()
            .map(|(i, task)| (i + 1, task))
    }

    /// Number of task lines (non-task lines excluded)
    pub fn len(&self) -> usize {
        self.lines.iter().filter(|l| l.as_task().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a task by its 1-based display index
    pub fn get(&self, display_index: usize) -> Option<&TaskRecord> {
        self.index_of(display_index)
            .and_then(|pos| self.lines[pos].as_task())
    }

    /// Map a 1-based display index to its position in `lines`
    pub fn index_of(&self, display_index: usize) -> Option<usize> {
        if display_index == 0 {
            return None;
        }
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.as_task().is_some())
            .nth(display_index - 1)
            .map(|(pos, _)| pos)
    }

    pub fn count_by_status(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for (_, task) in self.tasks() {
            counts.add(task.status);
        }
        counts
    }

    /// Unique tags across all tasks, in order of first occurrence
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for (_, task) in self.tasks() {
            for tag in &task.tags {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }
        tags
    }
}
