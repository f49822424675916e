use std::fs;
use std::path::{Path, PathBuf};

use crate::io::atomic::atomic_write;
use crate::io::project_io::ProjectError;
use crate::model::config::{Configuration, FileFormat, Theme, validate_folder_name};
use crate::model::project::Workspace;

pub const CONFIG_FILE: &str = "todoscript.toml";

/// Keys accepted by `config set`
pub const EDITABLE_KEYS: [&str; 3] = ["root_folder", "file_format", "theme"];

pub fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join(CONFIG_FILE)
}

pub fn has_been_configured(base_dir: &Path) -> bool {
    config_path(base_dir).is_file()
}

/// Read the config, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing.
pub fn read_config(
    base_dir: &Path,
) -> Result<(Configuration, toml_edit::DocumentMut), ProjectError> {
    let path = config_path(base_dir);
    if !path.is_file() {
        return Err(ProjectError::ConfigNotFound(base_dir.to_path_buf()));
    }
    let text = fs::read_to_string(&path).map_err(|e| ProjectError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config: Configuration = toml::from_str(&text)?;
    config.validate().map_err(ProjectError::InvalidConfig)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Load the configuration of `base_dir` into a workspace.
pub fn load_workspace(base_dir: &Path) -> Result<Workspace, ProjectError> {
    let (config, _) = read_config(base_dir)?;
    tracing::debug!(
        base = %base_dir.display(),
        format = %config.file_format,
        "configuration loaded"
    );
    Ok(Workspace::new(base_dir.to_path_buf(), config))
}

/// Write a fresh config file (first-run setup).
pub fn write_config(base_dir: &Path, config: &Configuration) -> Result<(), ProjectError> {
    config.validate().map_err(ProjectError::InvalidConfig)?;
    let root = if config.root_folder.is_absolute() {
        config.root_folder.clone()
    } else {
        base_dir.join(&config.root_folder)
    };
    if !root.is_dir() {
        return Err(ProjectError::InvalidConfig(format!(
            "root folder {} is not a directory",
            root.display()
        )));
    }
    let text = toml::to_string_pretty(config)?;
    write_text(base_dir, &text)?;
    tracing::info!(path = %config_path(base_dir).display(), "configuration saved");
    Ok(())
}

/// Set one key in the config document, checking the value first.
///
/// `parent_folder_name` is fixed once projects have been generated under it
/// and cannot be changed here.
pub fn set_config_value(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    value: &str,
) -> Result<(), ProjectError> {
    match key {
        "root_folder" => {
            if value.trim().is_empty() {
                return Err(ProjectError::InvalidConfig(
                    "root_folder cannot be empty".into(),
                ));
            }
        }
        "file_format" => {
            value
                .parse::<FileFormat>()
                .map_err(ProjectError::InvalidConfig)?;
        }
        "theme" => {
            value.parse::<Theme>().map_err(ProjectError::InvalidConfig)?;
        }
        "parent_folder_name" => {
            validate_folder_name(value).map_err(ProjectError::InvalidConfig)?;
            return Err(ProjectError::InvalidConfig(
                "parent_folder_name cannot be changed after setup".into(),
            ));
        }
        other => {
            return Err(ProjectError::InvalidConfig(format!(
                "unknown key '{}' (expected: {})",
                other,
                EDITABLE_KEYS.join(", ")
            )));
        }
    }
    let decor = doc
        .get(key)
        .and_then(|item| item.as_value())
        .map(|old| old.decor().clone());
    let mut new_value = toml_edit::Value::from(value);
    if let Some(decor) = decor {
        *new_value.decor_mut() = decor;
    }
    doc[key] = toml_edit::Item::Value(new_value);
    Ok(())
}

/// Validate the edited document and write it back, preserving formatting.
pub fn write_config_doc(
    base_dir: &Path,
    doc: &toml_edit::DocumentMut,
) -> Result<Configuration, ProjectError> {
    let text = doc.to_string();
    let config: Configuration = toml::from_str(&text)?;
    config.validate().map_err(ProjectError::InvalidConfig)?;
    write_text(base_dir, &text)?;
    Ok(config)
}

fn write_text(base_dir: &Path, text: &str) -> Result<(), ProjectError> {
    let path = config_path(base_dir);
    atomic_write(&path, text.as_bytes()).map_err(|e| ProjectError::WriteError { path, source: e })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# written by hand
root_folder = ".."
parent_folder_name = "TODOs"
file_format = "txt"  # plain text
theme = "vesper"
"#
    }

    #[test]
    fn test_read_missing_config() {
        let tmp = TempDir::new().unwrap();
        assert!(!has_been_configured(tmp.path()));
        assert!(matches!(
            read_config(tmp.path()),
            Err(ProjectError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn test_write_then_load_workspace() {
        let tmp = TempDir::new().unwrap();
        let mut config = Configuration::new(".");
        config.theme = Theme::Monokai;
        write_config(tmp.path(), &config).unwrap();
        assert!(has_been_configured(tmp.path()));

        let ws = load_workspace(tmp.path()).unwrap();
        assert_eq!(ws.config, config);
        assert_eq!(ws.base_dir, tmp.path());
    }

    #[test]
    fn test_write_rejects_bad_config() {
        let tmp = TempDir::new().unwrap();
        let mut config = Configuration::new(".");
        config.parent_folder_name = "a:b".into();
        assert!(matches!(
            write_config(tmp.path(), &config),
            Err(ProjectError::InvalidConfig(_))
        ));

        let config = Configuration::new("does/not/exist");
        assert!(matches!(
            write_config(tmp.path(), &config),
            Err(ProjectError::InvalidConfig(_))
        ));
        assert!(!has_been_configured(tmp.path()));
    }

    #[test]
    fn test_read_rejects_invalid_folder_name() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            config_path(tmp.path()),
            "root_folder = \".\"\nparent_folder_name = \"x/y\"\n",
        )
        .unwrap();
        assert!(matches!(
            read_config(tmp.path()),
            Err(ProjectError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_round_trip_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(config_path(tmp.path()), sample_config()).unwrap();

        let (_config, doc) = read_config(tmp.path()).unwrap();
        write_config_doc(tmp.path(), &doc).unwrap();

        let written = fs::read_to_string(config_path(tmp.path())).unwrap();
        assert_eq!(written, sample_config());
    }

    #[test]
    fn test_set_value_preserves_comments() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_config_value(&mut doc, "theme", "dracula").unwrap();
        let result = doc.to_string();
        assert!(result.contains("theme = \"dracula\""));
        assert!(result.starts_with("# written by hand\n"));
        let config: Configuration = toml::from_str(&result).unwrap();
        assert_eq!(config.theme, Theme::Dracula);

        set_config_value(&mut doc, "file_format", "md").unwrap();
        assert!(doc.to_string().contains("file_format = \"md\"  # plain text\n"));
    }

    #[test]
    fn test_write_failure_is_write_error() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(CONFIG_FILE)).unwrap();
        let err = write_config(tmp.path(), &Configuration::new(".")).unwrap_err();
        assert!(matches!(err, ProjectError::WriteError { .. }));
        assert!(err.to_string().starts_with("could not write"));
    }

    #[test]
    fn test_set_value_validation() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        assert!(set_config_value(&mut doc, "file_format", "docx").is_err());
        assert!(set_config_value(&mut doc, "theme", "solarized").is_err());
        assert!(set_config_value(&mut doc, "parent_folder_name", "Tasks").is_err());
        assert!(set_config_value(&mut doc, "colour", "red").is_err());
        assert_eq!(doc.to_string(), sample_config());

        set_config_value(&mut doc, "file_format", "md").unwrap();
        let config: Configuration = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.file_format, FileFormat::Md);
    }
}
