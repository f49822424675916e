use crate::model::store::StoreLine;
use crate::model::task::TaskRecord;

/// Serialize a task to its persisted line, newline included.
///
/// `[ ] text\n` or `[x] text\n`; tags live inside `text`.
pub fn serialize_record(task: &TaskRecord) -> String {
    format!("{} {}\n", task.status.marker(), task.text)
}

/// Serialize a full store back to file content.
/// Non-task lines are emitted verbatim.
pub fn serialize_tasks(lines: &[StoreLine]) -> String {
    let mut out = String::new();
    for line in lines {
        match line {
            StoreLine::Task(task) => out.push_str(&serialize_record(task)),
            StoreLine::Other(text) => {
                out.push_str(text);
                out.push('\n');
            }
        }
    }
    out
}
