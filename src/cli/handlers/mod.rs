mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::project_io::{self, ProjectError, ScaffoldStatus};
use crate::io::{config_io, store_io};
use crate::model::project::Workspace;
use crate::model::task::TaskStatus;
use crate::ops::export::{self, ExportFormat, ExportOptions};
use crate::ops::filter::{self, FilterSpec};
use crate::ops::report::{self, ReportFormat};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = resolve_start(cli.base_dir.as_deref())?;

    let ws = || load_workspace(&start);

    match cli.command {
        // Init runs before any configuration exists
        Commands::Init(args) => cmd_init(args, &start),
        Commands::Config(args) => cmd_config(args, &start, json),
        Commands::Generate => cmd_generate(&ws()?, json),
        Commands::Projects => cmd_projects(&ws()?, json),

        // Read commands
        Commands::List(args) => cmd_list(&ws()?, args, json),
        Commands::Tags(args) => cmd_tags(&ws()?, args, json),

        // Write commands
        Commands::Add(args) => cmd_add(&ws()?, args, json),
        Commands::Edit(args) => cmd_edit(&ws()?, args, json),
        Commands::Done(args) => cmd_set_status(&ws()?, args, TaskStatus::Complete, json),
        Commands::Undo(args) => cmd_set_status(&ws()?, args, TaskStatus::Pending, json),
        Commands::Delete(args) => cmd_delete(&ws()?, args, json),
        Commands::Tag(args) => cmd_tag(&ws()?, args, json),

        // Export and reports
        Commands::Export(args) => cmd_export(&ws()?, args, json),
        Commands::Report(args) => cmd_report(&ws()?, args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The -C directory if given, otherwise the current directory
fn resolve_start(base_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match base_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

fn load_workspace(start: &Path) -> Result<Workspace, ProjectError> {
    let base = project_io::discover_base(start)?;
    config_io::load_workspace(&base)
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_tasks(ws: &Workspace, project: &str, indices: &[usize], verb: &str, json: bool) -> CmdResult {
    let path = project_io::task_file(ws, project)?;
    let store = store_io::load_store(&path)?;
    if json {
        let tasks: Vec<_> = indices
            .iter()
            .filter_map(|&i| store.get(i).map(|t| task_to_json(i, t, false)))
            .collect();
        return print_json(&tasks);
    }
    for &i in indices {
        if let Some(task) = store.get(i) {
            println!("{} {}", verb, format_task_line(i, task, false));
        }
    }
    Ok(())
}

/// Sorted, deduplicated copy of user-supplied indices
fn normalize_indices(indices: &[usize]) -> Vec<usize> {
    let mut out = indices.to_vec();
    out.sort_unstable();
    out.dedup();
    out
}

// ---------------------------------------------------------------------------
// Configuration and projects
// ---------------------------------------------------------------------------

fn cmd_config(args: ConfigCmd, start: &Path, json: bool) -> CmdResult {
    let base = project_io::discover_base(start)?;
    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let (config, doc) = config_io::read_config(&base)?;
            if json {
                print_json(&config)
            } else {
                println!("# {}", config_io::config_path(&base).display());
                print!("{}", doc);
                Ok(())
            }
        }
        ConfigAction::Set(set) => {
            let (_, mut doc) = config_io::read_config(&base)?;
            config_io::set_config_value(&mut doc, &set.key, &set.value)?;
            let config = config_io::write_config_doc(&base, &doc)?;
            if json {
                print_json(&config)
            } else {
                println!("{} = {}", set.key, set.value);
                Ok(())
            }
        }
    }
}

fn cmd_generate(ws: &Workspace, json: bool) -> CmdResult {
    let outcomes = project_io::scaffold_projects(ws)?;
    let mut failed = 0;

    if json {
        let items: Vec<_> = outcomes
            .iter()
            .map(|o| match &o.status {
                ScaffoldStatus::Created(path) => OutcomeJson {
                    target: o.project.clone(),
                    path: Some(path.display().to_string()),
                    error: None,
                },
                ScaffoldStatus::Exists => OutcomeJson {
                    target: o.project.clone(),
                    path: None,
                    error: None,
                },
                ScaffoldStatus::Failed(e) => {
                    failed += 1;
                    OutcomeJson {
                        target: o.project.clone(),
                        path: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect();
        print_json(&items)?;
    } else {
        for o in &outcomes {
            match &o.status {
                ScaffoldStatus::Created(path) => {
                    println!("created {} ({})", o.project, path.display())
                }
                ScaffoldStatus::Exists => println!("exists  {}", o.project),
                ScaffoldStatus::Failed(e) => {
                    failed += 1;
                    eprintln!("failed  {}: {}", o.project, e);
                }
            }
        }
        if outcomes.is_empty() {
            println!("no folders found in {}", ws.root_folder().display());
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} folders could not be set up", failed, outcomes.len()).into());
    }
    Ok(())
}

fn cmd_projects(ws: &Workspace, json: bool) -> CmdResult {
    let projects = project_io::list_projects(ws)?;
    if json {
        return print_json(&projects);
    }
    if projects.is_empty() {
        println!("no projects (run `todoscript generate`)");
    }
    for (i, name) in projects.iter().enumerate() {
        println!("{}. {}", i + 1, name);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ws: &Workspace, args: ListArgs, json: bool) -> CmdResult {
    let spec = match (args.status.as_deref(), args.tag.as_deref()) {
        (Some(status), _) => FilterSpec::Status(
            status
                .parse::<TaskStatus>()
                .map_err(Box::<dyn std::error::Error>::from)?,
        ),
        (None, Some(tag)) => FilterSpec::Tag(tag.trim().trim_start_matches('@').to_string()),
        (None, None) => FilterSpec::All,
    };

    let path = project_io::task_file(ws, &args.project)?;
    let store = store_io::load_store(&path)?;
    let tasks = filter::apply(&store, &spec);
    let counts = store.count_by_status();

    if json {
        return print_json(&TaskListJson {
            project: args.project,
            file: path.display().to_string(),
            tasks: tasks
                .iter()
                .map(|&(i, t)| task_to_json(i, t, args.strip_tags))
                .collect(),
            progress: progress_to_json(&counts),
        });
    }

    println!("== {} ==", args.project);
    if tasks.is_empty() {
        println!("(no tasks)");
    }
    for (i, task) in tasks {
        println!("{}", format_task_line(i, task, args.strip_tags));
    }
    println!();
    println!("{}", format_progress(&counts));
    Ok(())
}

fn cmd_tags(ws: &Workspace, args: ProjectArg, json: bool) -> CmdResult {
    let path = project_io::task_file(ws, &args.project)?;
    let tags = store_io::load_store(&path)?.all_tags();
    if json {
        return print_json(&tags);
    }
    for tag in tags {
        println!("@{}", tag);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ws: &Workspace, args: AddArgs, json: bool) -> CmdResult {
    let path = project_io::task_file(ws, &args.project)?;
    let status = if args.done {
        TaskStatus::Complete
    } else {
        TaskStatus::Pending
    };
    let (index, task) = store_io::append_task(&path, &args.text, status)?;
    if json {
        return print_json(&task_to_json(index, &task, false));
    }
    println!("added {}", format_task_line(index, &task, false));
    Ok(())
}

fn cmd_edit(ws: &Workspace, args: EditArgs, json: bool) -> CmdResult {
    let path = project_io::task_file(ws, &args.project)?;
    let task = store_io::edit_task(&path, args.index, &args.text)?;
    if json {
        return print_json(&task_to_json(args.index, &task, false));
    }
    println!("edited {}", format_task_line(args.index, &task, false));
    Ok(())
}

fn cmd_set_status(ws: &Workspace, args: IndicesArgs, status: TaskStatus, json: bool) -> CmdResult {
    let path = project_io::task_file(ws, &args.project)?;
    let indices = normalize_indices(&args.indices);
    store_io::set_status(&path, &indices, status)?;
    print_tasks(ws, &args.project, &indices, "marked", json)
}

fn cmd_delete(ws: &Workspace, args: IndicesArgs, json: bool) -> CmdResult {
    let path = project_io::task_file(ws, &args.project)?;
    let indices = normalize_indices(&args.indices);
    let removed = store_io::delete_tasks(&path, &indices)?;
    if json {
        let tasks: Vec<_> = indices
            .iter()
            .zip(&removed)
            .map(|(&i, t)| task_to_json(i, t, false))
            .collect();
        return print_json(&tasks);
    }
    for (&i, task) in indices.iter().zip(&removed) {
        println!("deleted {}", format_task_line(i, task, false));
    }
    Ok(())
}

fn cmd_tag(ws: &Workspace, args: TagArgs, json: bool) -> CmdResult {
    let path = project_io::task_file(ws, &args.project)?;
    let indices = normalize_indices(&args.indices);
    store_io::add_tags(&path, &indices, &args.tags)?;
    print_tasks(ws, &args.project, &indices, "tagged", json)
}

// ---------------------------------------------------------------------------
// Export and reports
// ---------------------------------------------------------------------------

fn cmd_export(ws: &Workspace, args: ExportArgs, json: bool) -> CmdResult {
    let mut formats = Vec::new();
    for name in &args.formats {
        for part in split_list(name) {
            let format = part
                .parse::<ExportFormat>()
                .map_err(Box::<dyn std::error::Error>::from)?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
    }
    if formats.is_empty() {
        return Err("no export formats given".into());
    }

    let path = project_io::task_file(ws, &args.project)?;
    let store = store_io::load_store(&path)?;
    let tasks: Vec<_> = store.tasks().collect();
    let options = ExportOptions {
        delimiter: args.delimiter,
        strip_tags: args.strip_tags,
    };

    let outcomes = export::export_tasks(ws, &args.project, &tasks, &formats, &options);
    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();

    if json {
        let items: Vec<_> = outcomes
            .iter()
            .map(|o| OutcomeJson {
                target: o.format.to_string(),
                path: o.result.as_ref().ok().map(|p| p.display().to_string()),
                error: o.result.as_ref().err().map(|e| e.to_string()),
            })
            .collect();
        print_json(&items)?;
    } else {
        for o in &outcomes {
            match &o.result {
                Ok(path) => println!("exported {} -> {}", o.format, path.display()),
                Err(e) => eprintln!("failed   {}: {}", o.format, e),
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} exports failed", failed, outcomes.len()).into());
    }
    Ok(())
}

fn cmd_report(ws: &Workspace, args: ReportArgs, json: bool) -> CmdResult {
    let formats = match args.export.as_deref() {
        Some(list) => split_list(list)
            .into_iter()
            .map(|s| s.parse::<ReportFormat>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(Box::<dyn std::error::Error>::from)?,
        None => Vec::new(),
    };

    let summary = report::summarize_projects(ws)?;

    if json {
        print_json(&ReportJson {
            projects: summary
                .reports
                .iter()
                .map(|r| ProjectReportJson {
                    report: r,
                    percentage: r.percentage(),
                })
                .collect(),
            errors: summary
                .failures
                .iter()
                .map(|(project, e)| ProjectErrorJson {
                    project: project.clone(),
                    error: e.to_string(),
                })
                .collect(),
        })?;
    } else {
        let width = summary
            .reports
            .iter()
            .map(|r| r.project.chars().count())
            .max()
            .unwrap_or(0);
        for r in &summary.reports {
            println!("{}", format_report_line(r, width));
        }
        if summary.reports.is_empty() {
            println!("no projects (run `todoscript generate`)");
        }
        for (project, e) in &summary.failures {
            eprintln!("skipped {}: {}", project, e);
        }
    }

    if formats.is_empty() {
        return Ok(());
    }
    let outcomes = report::write_reports(ws, &summary.reports, &formats);
    let mut failed = 0;
    for o in &outcomes {
        match &o.result {
            Ok(path) => eprintln!("wrote {}", path.display()),
            Err(e) => {
                failed += 1;
                eprintln!("failed {}: {}", o.format, e);
            }
        }
    }
    if failed > 0 {
        return Err(format!("{} of {} report files failed", failed, outcomes.len()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_indices() {
        assert_eq!(normalize_indices(&[3, 1, 3, 2]), vec![1, 2, 3]);
        assert!(normalize_indices(&[]).is_empty());
    }
}
