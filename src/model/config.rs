use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration from todoscript.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Directory whose subdirectories become projects
    pub root_folder: PathBuf,
    /// Name of the folder (under the base directory) holding generated task lists
    #[serde(default = "default_parent_folder_name")]
    pub parent_folder_name: String,
    #[serde(default)]
    pub file_format: FileFormat,
    #[serde(default)]
    pub theme: Theme,
}

/// Default: `TODOs`
fn default_parent_folder_name() -> String {
    "TODOs".to_string()
}

impl Configuration {
    pub fn new(root_folder: impl Into<PathBuf>) -> Self {
        Configuration {
            root_folder: root_folder.into(),
            parent_folder_name: default_parent_folder_name(),
            file_format: FileFormat::default(),
            theme: Theme::default(),
        }
    }

    /// Check field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        validate_folder_name(&self.parent_folder_name)
    }
}

/// A tasks folder name must be non-empty, contain neither `/` nor `:`,
/// and name a single folder (not `.` or `..`).
pub fn validate_folder_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("parent_folder_name cannot be empty".to_string());
    }
    if name.contains(['/', ':']) {
        return Err(format!(
            "invalid folder name '{}' (cannot contain \"/\" or \":\")",
            name
        ));
    }
    if !is_plain_name(name) {
        return Err(format!(
            "invalid folder name '{}' (must name a single folder)",
            name
        ));
    }
    Ok(())
}

/// True when `name` is exactly one normal path component.
pub fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// On-disk format chosen for newly generated task files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Md,
    Json,
    Csv,
    Yaml,
    #[default]
    Txt,
}

impl FileFormat {
    pub const ALL: [FileFormat; 5] = [
        FileFormat::Md,
        FileFormat::Json,
        FileFormat::Csv,
        FileFormat::Yaml,
        FileFormat::Txt,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Md => "md",
            FileFormat::Json => "json",
            FileFormat::Csv => "csv",
            FileFormat::Yaml => "yaml",
            FileFormat::Txt => "txt",
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileFormat::ALL
            .into_iter()
            .find(|f| f.extension() == s)
            .ok_or_else(|| {
                format!(
                    "unknown file format '{}' (expected: md, json, csv, yaml, txt)",
                    s
                )
            })
    }
}

/// Color theme name; only stored here, applied by the presentation layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Vesper,
    Dracula,
    Monokai,
}

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Theme::Vesper => "vesper",
            Theme::Dracula => "dracula",
            Theme::Monokai => "monokai",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vesper" => Ok(Theme::Vesper),
            "dracula" => Ok(Theme::Dracula),
            "monokai" => Ok(Theme::Monokai),
            _ => Err(format!(
                "unknown theme '{}' (expected: vesper, dracula, monokai)",
                s
            )),
        }
    }
}
