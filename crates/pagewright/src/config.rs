//! Configuration file loading and flag precedence.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pagewright_static::BuildConfig;
use serde::Deserialize;

use crate::Cli;

/// Configuration file structure (site.toml).
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub paths: PathsSection,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct SiteSection {
    pub title: Option<String>,
    pub paginate_by: Option<usize>,
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct PathsSection {
    pub content: Option<PathBuf>,
    pub templates: Option<PathBuf>,
    #[serde(rename = "static")]
    pub static_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}

/// Merge flags over the config file over defaults.
pub fn resolve(cli: &Cli, file: ConfigFile) -> BuildConfig {
    let defaults = BuildConfig::default();

    BuildConfig {
        site_title: cli
            .sitename
            .clone()
            .or(file.site.title)
            .unwrap_or(defaults.site_title),
        page_size: cli.paginatedby.or(file.site.paginate_by),
        content_dir: cli
            .content
            .clone()
            .or(file.paths.content)
            .unwrap_or(defaults.content_dir),
        templates_dir: cli.templates.clone().or(file.paths.templates),
        static_dir: cli
            .static_dir
            .clone()
            .or(file.paths.static_dir)
            .unwrap_or(defaults.static_dir),
        output_dir: cli
            .output
            .clone()
            .or(file.paths.output)
            .unwrap_or(defaults.output_dir),
        parallel: cli.parallel || file.site.parallel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn defaults_without_file_or_flags() {
        let cli = Cli::parse_from(["pagewright"]);

        let config = resolve(&cli, ConfigFile::default());

        assert_eq!(config.site_title, "My site");
        assert_eq!(config.page_size, None);
        assert_eq!(config.content_dir, PathBuf::from("content"));
        assert_eq!(config.templates_dir, None);
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert!(!config.parallel);
    }

    #[test]
    fn flags_override_file() {
        let cli = Cli::parse_from([
            "pagewright",
            "--sitename",
            "Flag Site",
            "--paginatedby",
            "3",
            "--output",
            "public",
        ]);
        let file: ConfigFile = toml::from_str(
            r#"
[site]
title = "File Site"
paginate_by = 10

[paths]
output = "dist"
templates = "theme"
"#,
        )
        .unwrap();

        let config = resolve(&cli, file);

        assert_eq!(config.site_title, "Flag Site");
        assert_eq!(config.page_size, Some(3));
        assert_eq!(config.output_dir, PathBuf::from("public"));
        assert_eq!(config.templates_dir, Some(PathBuf::from("theme")));
    }

    #[test]
    fn missing_file_is_default() {
        let temp = tempdir().unwrap();

        let config = load_config(&temp.path().join("site.toml")).unwrap();

        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("site.toml");
        fs::write(&path, "[site\ntitle = ").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn reads_static_path() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("site.toml");
        fs::write(&path, "[paths]\nstatic = \"assets\"\n").unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.paths.static_dir, Some(PathBuf::from("assets")));
    }
}
