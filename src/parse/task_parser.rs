use std::sync::LazyLock;

use regex::Regex;

use crate::model::store::StoreLine;
use crate::model::task::{TaskRecord, TaskStatus};

/// `@` followed by one or more word characters
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("tag pattern is valid"));

/// Parse one line of a task file (without its line terminator).
///
/// Returns `None` when the line does not start with `[ ]` or `[x]`; such
/// lines are kept verbatim by the store but are not tasks.
pub fn parse_line(line: &str) -> Option<TaskRecord> {
    let marker = line.get(..3)?;
    let status = TaskStatus::from_marker(marker)?;

    // One separating space after the marker; anything past it is text
    let rest = &line[3..];
    let text = rest.strip_prefix(' ').unwrap_or(rest);

    Some(TaskRecord {
        status,
        text: text.to_string(),
        tags: extract_tags(text),
    })
}

/// Parse a line into a store entry, keeping non-task lines as-is
pub fn parse_store_line(line: &str) -> StoreLine {
    match parse_line(line) {
        Some(task) => StoreLine::Task(task),
        None => StoreLine::Other(line.to_string()),
    }
}

/// Parse the full text of a task file.
pub fn parse_tasks(content: &str) -> Vec<StoreLine> {
    content
        .lines()
        .map(parse_store_line)
        .collect()
}

/// Collect tags from text, left to right, dropping repeats.
pub fn extract_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for cap in TAG_RE.captures_iter(text) {
        let tag = &cap[1];
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Remove every `@tag` token and collapse the remaining whitespace.
pub fn strip_tags(text: &str) -> String {
    let stripped = TAG_RE.replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a comma-separated tag list into `@tag` tokens.
///
/// Entries are trimmed, empty ones dropped, and a leading `@` is not doubled.
pub fn tag_tokens(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().trim_start_matches('@'))
        .filter(|t| !t.is_empty())
        .map(|t| format!("@{}", t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pending_task() {
        let task = parse_line("[ ] buy milk").unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.text, "buy milk");
        assert!(task.tags.is_empty());
    }

    #[test]
    fn test_parse_complete_task_with_tag() {
        let task = parse_line("[x] call mom @family").unwrap();
        assert_eq!(task.status, TaskStatus::Complete);
        assert_eq!(task.text, "call mom @family");
        assert_eq!(task.tags, vec!["family"]);
    }

    #[test]
    fn test_parse_rejects_other_markers() {
        for line in [
            "# groceries todos",
            "",
            "[X] upper-case marker",
            "[-] blocked",
            " [ ] indented",
            "- [ ] markdown bullet",
            "[x",
        ] {
            assert_eq!(parse_line(line), None, "line: {:?}", line);
        }
    }

    #[test]
    fn test_parse_marker_without_space() {
        let task = parse_line("[x]done already").unwrap();
        assert_eq!(task.text, "done already");
        let task = parse_line("[ ]").unwrap();
        assert_eq!(task.text, "");
    }

    #[test]
    fn test_parse_keeps_extra_spacing() {
        let task = parse_line("[ ]   indented text ").unwrap();
        assert_eq!(task.text, "  indented text ");
    }

    #[test]
    fn test_parse_multibyte_first_chars() {
        assert_eq!(parse_line("é[ ] x"), None);
        assert_eq!(parse_line("✔"), None);
    }

    #[test]
    fn test_extract_tags_order_and_dedup() {
        assert_eq!(
            extract_tags("@b fix @a the @b thing @c_1"),
            vec!["b", "a", "c_1"]
        );
        assert!(extract_tags("no tags @ here").is_empty());
        assert_eq!(extract_tags("mail bob@example.com"), vec!["example"]);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("call mom @family"), "call mom");
        assert_eq!(strip_tags("@urgent fix  @now the bug"), "fix the bug");
        assert_eq!(strip_tags("@only"), "");
    }

    #[test]
    fn test_tag_tokens() {
        assert_eq!(
            tag_tokens(" home, @errand ,,work "),
            vec!["@home", "@errand", "@work"]
        );
        assert!(tag_tokens(" , ").is_empty());
    }

    #[test]
    fn test_parse_tasks_mixed_lines() {
        let lines = parse_tasks("# api todos\n[ ] one\n\n[x] two @x\n");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], StoreLine::Other("# api todos".into()));
        assert!(matches!(&lines[1], StoreLine::Task(t) if t.text == "one"));
        assert_eq!(lines[2], StoreLine::Other(String::new()));
        assert!(matches!(&lines[3], StoreLine::Task(t) if t.tags == ["x"]));
    }
}
