use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::{config_io, project_io};
use crate::model::config::{Configuration, FileFormat, Theme};

/// Build the configuration described by `init` flags.
fn build_config(args: &InitArgs) -> Result<Configuration, String> {
    let mut config = Configuration::new(args.root_folder.trim());
    if let Some(ref name) = args.parent_folder_name {
        config.parent_folder_name = name.trim().to_string();
    }
    if let Some(ref format) = args.format {
        config.file_format = format.trim().parse::<FileFormat>()?;
    }
    if let Some(ref theme) = args.theme {
        config.theme = theme.trim().parse::<Theme>()?;
    }
    config.validate()?;
    Ok(config)
}

pub fn cmd_init(args: InitArgs, base_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if config_io::has_been_configured(base_dir) && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            config_io::config_path(base_dir).display()
        )
        .into());
    }

    if let Some(parent) = base_dir.parent()
        && let Ok(parent_base) = project_io::discover_base(parent)
    {
        eprintln!(
            "Note: parent configuration found at {}",
            config_io::config_path(&parent_base).display()
        );
    }

    let config = build_config(&args)?;
    config_io::write_config(base_dir, &config)?;

    println!(
        "Wrote {}",
        config_io::config_path(base_dir).display()
    );
    println!("  root folder: {}", config.root_folder.display());
    println!("  task lists:  {}/", config.parent_folder_name);
    println!("  format:      {}", config.file_format);
    println!("Run `todoscript generate` to create the projects.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(root: &str) -> InitArgs {
        InitArgs {
            root_folder: root.to_string(),
            parent_folder_name: None,
            format: None,
            theme: None,
            force: false,
        }
    }

    #[test]
    fn test_build_config_defaults() {
        let config = build_config(&args("..")).unwrap();
        assert_eq!(config, Configuration::new(".."));
    }

    #[test]
    fn test_build_config_overrides() {
        let mut a = args("src");
        a.parent_folder_name = Some("Tasks".into());
        a.format = Some("md".into());
        a.theme = Some("dracula".into());
        let config = build_config(&a).unwrap();
        assert_eq!(config.parent_folder_name, "Tasks");
        assert_eq!(config.file_format, FileFormat::Md);
        assert_eq!(config.theme, Theme::Dracula);
    }

    #[test]
    fn test_build_config_invalid() {
        let mut a = args("src");
        a.parent_folder_name = Some("to:do".into());
        assert!(build_config(&a).is_err());

        let mut a = args("src");
        a.format = Some("docx".into());
        assert!(build_config(&a).is_err());
    }
}
