use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "todoscript", about = concat!("todoscript v", env!("CARGO_PKG_VERSION"), " - per-project task lists in plain text"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different base directory
    #[arg(short = 'C', long = "base-dir", global = true)]
    pub base_dir: Option<String>,

    /// Log debug details to stderr (overrides TODOSCRIPT_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write todoscript.toml in the base directory (first-run setup)
    Init(InitArgs),
    /// Show or change the configuration
    Config(ConfigCmd),
    /// Create a project with a task file for every folder under the root folder
    Generate,
    /// List projects
    Projects,
    /// List a project's tasks
    List(ListArgs),
    /// Append a task
    Add(AddArgs),
    /// Replace a task's text
    Edit(EditArgs),
    /// Mark tasks complete
    Done(IndicesArgs),
    /// Mark tasks pending again
    Undo(IndicesArgs),
    /// Permanently delete tasks
    Delete(IndicesArgs),
    /// Append tags to tasks
    Tag(TagArgs),
    /// List the tags used in a project
    Tags(ProjectArg),
    /// Export a project's tasks to its exports/ folder
    Export(ExportArgs),
    /// Show completion progress for every project
    Report(ReportArgs),
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Folder whose subfolders become projects
    pub root_folder: String,
    /// Name of the folder holding the task lists (default: TODOs)
    #[arg(long)]
    pub parent_folder_name: Option<String>,
    /// Task file format: md, json, csv, yaml, txt (default: txt)
    #[arg(long)]
    pub format: Option<String>,
    /// Color theme: vesper, dracula, monokai (default: vesper)
    #[arg(long)]
    pub theme: Option<String>,
    /// Overwrite an existing todoscript.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the configuration (default)
    Show,
    /// Change one key: root_folder, file_format or theme
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectArg {
    /// Project name
    pub project: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Project name
    pub project: String,
    /// Filter by status (pending, completed)
    #[arg(long, conflicts_with = "tag")]
    pub status: Option<String>,
    /// Filter by tag (with or without the @)
    #[arg(long)]
    pub tag: Option<String>,
    /// Hide @tags in task text
    #[arg(long)]
    pub strip_tags: bool,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Project name
    pub project: String,
    /// Task text; @words become tags
    pub text: String,
    /// Add the task already completed
    #[arg(long)]
    pub done: bool,
}

#[derive(Args)]
pub struct EditArgs {
    /// Project name
    pub project: String,
    /// Task number, as shown by `list`
    pub index: usize,
    /// New task text
    pub text: String,
}

#[derive(Args)]
pub struct IndicesArgs {
    /// Project name
    pub project: String,
    /// Task numbers, as shown by `list`
    #[arg(required = true, num_args = 1..)]
    pub indices: Vec<usize>,
}

#[derive(Args)]
pub struct TagArgs {
    /// Project name
    pub project: String,
    /// Task numbers, as shown by `list`
    #[arg(required = true, num_args = 1..)]
    pub indices: Vec<usize>,
    /// Comma-separated tags to append
    #[arg(long)]
    pub tags: String,
}

// ---------------------------------------------------------------------------
// Export and reports
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExportArgs {
    /// Project name
    pub project: String,
    /// Formats to write: csv, json, yaml, md, html
    #[arg(required = true, num_args = 1..)]
    pub formats: Vec<String>,
    /// CSV field delimiter
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
    /// Remove @tags from the exported text
    #[arg(long)]
    pub strip_tags: bool,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Also write report files, comma-separated: csv, json, html
    #[arg(long, value_name = "FORMATS")]
    pub export: Option<String>,
}
