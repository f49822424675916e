use serde::{Deserialize, Serialize};

/// Task checkbox state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Complete,
}

impl TaskStatus {
    /// The 3-character marker that starts a persisted task line
    pub fn marker(self) -> &'static str {
        match self {
            TaskStatus::Pending => "[ ]",
            TaskStatus::Complete => "[x]",
        }
    }

    /// Parse a 3-character marker into a status
    pub fn from_marker(marker: &str) -> Option<TaskStatus> {
        match marker {
            "[ ]" => Some(TaskStatus::Pending),
            "[x]" => Some(TaskStatus::Complete),
            _ => None,
        }
    }

    /// Word used in exports and reports (`pending` / `completed`)
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Complete => "completed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" | "incomplete" | "todo" => Ok(TaskStatus::Pending),
            "completed" | "complete" | "done" => Ok(TaskStatus::Complete),
            _ => Err(format!(
                "unknown status '{}' (expected: pending, completed)",
                s
            )),
        }
    }
}

/// A single parsed task line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub status: TaskStatus,
    /// Description text, tags included verbatim
    pub text: String,
    /// Tags (without the `@` prefix), first occurrence order, no duplicates
    pub tags: Vec<String>,
}

impl TaskRecord {
    /// Create a record, deriving its tags from `text`
    pub fn new(status: TaskStatus, text: impl Into<String>) -> Self {
        let text = text.into();
        let tags = crate::parse::extract_tags(&text);
        TaskRecord { status, text, tags }
    }

    pub fn is_complete(&self) -> bool {
        self.status == TaskStatus::Complete
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim_start_matches('@');
        self.tags.iter().any(|t| t == tag)
    }

    /// The text with every `@tag` token removed and whitespace collapsed
    pub fn text_without_tags(&self) -> String {
        crate::parse::strip_tags(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_round_trip() {
        for status in [TaskStatus::Pending, TaskStatus::Complete] {
            assert_eq!(TaskStatus::from_marker(status.marker()), Some(status));
        }
        assert_eq!(TaskStatus::from_marker("[X]"), None);
        assert_eq!(TaskStatus::from_marker("[-]"), None);
    }

    #[test]
    fn test_new_derives_tags() {
        let task = TaskRecord::new(TaskStatus::Pending, "call mom @family @phone @family");
        assert_eq!(task.tags, vec!["family", "phone"]);
        assert!(task.has_tag("family"));
        assert!(task.has_tag("@phone"));
        assert!(!task.has_tag("work"));
    }

    #[test]
    fn test_text_without_tags() {
        let task = TaskRecord::new(TaskStatus::Complete, "call @family mom @later");
        assert_eq!(task.text_without_tags(), "call mom");
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("pending".parse::<TaskStatus>(), Ok(TaskStatus::Pending));
        assert_eq!("completed".parse::<TaskStatus>(), Ok(TaskStatus::Complete));
        assert!("parked".parse::<TaskStatus>().is_err());
    }
}
