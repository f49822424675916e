use std::path::{Path, PathBuf};

use super::config::Configuration;

/// Name of the per-project folder that receives exports
pub const EXPORTS_DIR: &str = "exports";
/// Name of the folder (under the base directory) that receives reports
pub const REPORTS_DIR: &str = "reports";

/// A loaded configuration together with the directory it was read from.
///
/// Created once at startup and passed by reference into every operation.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory holding todoscript.toml
    pub base_dir: PathBuf,
    pub config: Configuration,
}

impl Workspace {
    pub fn new(base_dir: PathBuf, config: Configuration) -> Self {
        Workspace { base_dir, config }
    }

    /// Directory whose subdirectories are scaffolded into projects
    pub fn root_folder(&self) -> PathBuf {
        resolve(&self.base_dir, &self.config.root_folder)
    }

    /// Directory holding one folder per project
    pub fn tasks_root(&self) -> PathBuf {
        self.base_dir.join(&self.config.parent_folder_name)
    }

    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.tasks_root().join(project)
    }

    pub fn exports_dir(&self, project: &str) -> PathBuf {
        self.project_dir(project).join(EXPORTS_DIR)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.base_dir.join(REPORTS_DIR)
    }

    /// File name for a newly scaffolded task list
    pub fn task_file_name(&self) -> String {
        format!("todos.{}", self.config.file_format.extension())
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
