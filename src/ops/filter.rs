use crate::model::store::TaskStore;
use crate::model::task::{TaskRecord, TaskStatus};

/// What subset of a task list to display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterSpec {
    #[default]
    All,
    Status(TaskStatus),
    /// Tag name, without the `@`
    Tag(String),
}

impl FilterSpec {
    pub fn matches(&self, task: &TaskRecord) -> bool {
        match self {
            FilterSpec::All => true,
            FilterSpec::Status(status) => task.status == *status,
            FilterSpec::Tag(tag) => task.has_tag(tag),
        }
    }
}

impl std::str::FromStr for FilterSpec {
    type Err = String;

    /// `all`, `pending`, `completed`, or `@tag`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "all" {
            return Ok(FilterSpec::All);
        }
        if let Some(tag) = s.strip_prefix('@') {
            if tag.is_empty() {
                return Err("empty tag filter".to_string());
            }
            return Ok(FilterSpec::Tag(tag.to_string()));
        }
        s.parse::<TaskStatus>()
            .map(FilterSpec::Status)
            .map_err(|_| format!("unknown filter '{}' (expected: all, pending, completed, @tag)", s))
    }
}

/// Select the tasks matching `spec`, keeping their display indices.
///
/// Indices are those of the unfiltered store, so an index picked from a
/// filtered view still addresses the same task in later operations.
pub fn apply<'a>(store: &'a TaskStore, spec: &FilterSpec) -> Vec<(usize, &'a TaskRecord)> {
    store
        .tasks()
        .filter(|(_, task)| spec.matches(task))
        .collect()
}
