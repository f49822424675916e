use std::fs;
use std::path::{Path, PathBuf};

use crate::io::atomic::atomic_write;
use crate::io::config_io::CONFIG_FILE;
use crate::model::config::is_plain_name;
use crate::model::project::Workspace;

/// Error type for configuration and project folder operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("not configured: no todoscript.toml found from {0} upward (run `todoscript init`)")]
    ConfigNotFound(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse todoscript.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not serialize todoscript.toml: {0}")]
    ConfigSerializeError(#[from] toml::ser::Error),
    #[error("could not edit todoscript.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("could not access folder {path}: {source}")]
    FolderIoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("no task file in {0}")]
    NoTaskFile(PathBuf),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Find the base directory by walking up from `start`, looking for
/// `todoscript.toml`.
pub fn discover_base(start: &Path) -> Result<PathBuf, ProjectError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ProjectError::ConfigNotFound(start.to_path_buf()));
        }
    }
}

// ---------------------------------------------------------------------------
// Scaffolding
// ---------------------------------------------------------------------------

/// What happened to one source folder during scaffolding
#[derive(Debug)]
pub enum ScaffoldStatus {
    /// Project folder and task file created at this path
    Created(PathBuf),
    /// Project folder already existed; left alone
    Exists,
    Failed(ProjectError),
}

#[derive(Debug)]
pub struct ScaffoldOutcome {
    pub project: String,
    pub status: ScaffoldStatus,
}

/// Create a project folder with an initial task file for every subdirectory
/// of the configured root folder that does not have one yet.
///
/// A failure on one folder is recorded in its outcome and does not stop the
/// others. Only an unreadable root folder is an error for the whole call.
pub fn scaffold_projects(ws: &Workspace) -> Result<Vec<ScaffoldOutcome>, ProjectError> {
    let root = ws.root_folder();
    let tasks_root = ws.tasks_root();
    let tasks_root_canon = fs::canonicalize(&tasks_root).ok();

    let mut outcomes = Vec::new();
    for (name, path) in list_subdirs(&root)? {
        // The tasks folder may itself live under the root folder
        if tasks_root_canon.is_some() && fs::canonicalize(&path).ok() == tasks_root_canon {
            continue;
        }
        let status = match create_project(ws, &name) {
            Ok(Some(file)) => {
                tracing::info!(project = %name, file = %file.display(), "created task file");
                ScaffoldStatus::Created(file)
            }
            Ok(None) => ScaffoldStatus::Exists,
            Err(e) => {
                tracing::warn!(project = %name, error = %e, "could not scaffold project");
                ScaffoldStatus::Failed(e)
            }
        };
        outcomes.push(ScaffoldOutcome {
            project: name,
            status,
        });
    }
    Ok(outcomes)
}

/// Create `<tasks_root>/<name>/todos.<ext>` unless the project folder exists.
fn create_project(ws: &Workspace, name: &str) -> Result<Option<PathBuf>, ProjectError> {
    let dir = ws.project_dir(name);
    if dir.exists() {
        return Ok(None);
    }
    let folder_err = |e: std::io::Error| ProjectError::FolderIoError {
        path: dir.clone(),
        source: e,
    };
    fs::create_dir_all(&dir).map_err(folder_err)?;
    let file = dir.join(ws.task_file_name());
    atomic_write(&file, format!("# {} todos\n", name).as_bytes()).map_err(folder_err)?;
    Ok(Some(file))
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Project names under the tasks root, sorted. Empty if nothing has been
/// generated yet.
pub fn list_projects(ws: &Workspace) -> Result<Vec<String>, ProjectError> {
    let tasks_root = ws.tasks_root();
    if !tasks_root.is_dir() {
        return Ok(Vec::new());
    }
    Ok(list_subdirs(&tasks_root)?
        .into_iter()
        .map(|(name, _)| name)
        .collect())
}

/// The task file of a project: the first regular, non-hidden file in its
/// folder by name. Subfolders such as `exports/` are never candidates, and
/// hidden files (including in-flight temporary files) are skipped.
pub fn task_file(ws: &Workspace, project: &str) -> Result<PathBuf, ProjectError> {
    let dir = ws.project_dir(project);
    if !is_plain_name(project) || !dir.is_dir() || !is_inside(&dir, &ws.tasks_root()) {
        return Err(ProjectError::ProjectNotFound(project.to_string()));
    }
    let entries = fs::read_dir(&dir).map_err(|e| ProjectError::FolderIoError {
        path: dir.clone(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        files.push((name, path));
    }
    files.sort();
    files
        .into_iter()
        .next()
        .map(|(_, path)| path)
        .ok_or(ProjectError::NoTaskFile(dir))
}

/// True when `dir` resolves to a location under `root`.
fn is_inside(dir: &Path, root: &Path) -> bool {
    match (fs::canonicalize(dir), fs::canonicalize(root)) {
        (Ok(dir), Ok(root)) => dir != root && dir.starts_with(root),
        _ => false,
    }
}

/// Non-hidden subdirectories of `dir`, sorted by name.
fn list_subdirs(dir: &Path) -> Result<Vec<(String, PathBuf)>, ProjectError> {
    let folder_err = |e: std::io::Error| ProjectError::FolderIoError {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(folder_err)? {
        let entry = entry.map_err(folder_err)?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        dirs.push((name, path));
    }
    dirs.sort();
    Ok(dirs)
}
