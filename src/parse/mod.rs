pub mod task_parser;
pub mod task_serializer;

pub use task_parser::{
    extract_tags, parse_line, parse_store_line, parse_tasks, strip_tags, tag_tokens,
};
pub use task_serializer::{serialize_record, serialize_tasks};
