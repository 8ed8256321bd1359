// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Dimension;

pub const DEFAULT_DATA_URL: &str =
    "https://github.com/JayatiPatel/streamlit_dashboard/raw/main/Coffee_Chain_Sales.csv";
pub const DATA_URL_ENV: &str = "SALES_DASHBOARD_DATA_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_url: String,
    pub output_dir: PathBuf,
    pub filters: FilterDefaults,
}

/// Selections used when the matching CLI flag is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDefaults {
    pub product_lines: Vec<String>,
    pub area_codes: Vec<String>,
    pub product_types: Vec<String>,
    pub states: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_url: DEFAULT_DATA_URL.to_string(),
            output_dir: PathBuf::from("output"),
            filters: FilterDefaults::default(),
        }
    }
}

impl FilterDefaults {
    pub fn values(&self, dimension: Dimension) -> &[String] {
        match dimension {
            Dimension::ProductLine => &self.product_lines,
            Dimension::AreaCode => &self.area_codes,
            Dimension::ProductType => &self.product_types,
            Dimension::State => &self.states,
        }
    }
}

pub fn get_config_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("config.toml");
    path
}

/// Read the config at `path` (or the default location). A missing file gives
/// the defaults; an unreadable or malformed one is an error.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    if !config_path.exists() {
        return Ok(Config::default());
    }
    let config_str = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let config: Config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;
    Ok(config)
}

pub fn save_config(config: &Config, path: Option<&Path>) -> anyhow::Result<PathBuf> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    let config_str = toml::to_string_pretty(config)?;
    fs::write(&config_path, config_str)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}

/// Write the default config unless one already exists at the target path.
pub fn init_config(path: Option<&Path>, force: bool) -> anyhow::Result<PathBuf> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists, pass --force to overwrite it",
            config_path.display()
        );
    }
    save_config(&Config::default(), Some(&config_path))
}

/// Apply the environment override for the data location.
pub fn apply_env(mut config: Config) -> Config {
    if let Ok(url) = std::env::var(DATA_URL_ENV) {
        if !url.trim().is_empty() {
            config.data_url = url.trim().to_string();
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = load_config(Some(&dir.path().join("absent.toml")))?;
        assert_eq!(config, Config::default());
        assert_eq!(config.data_url, DEFAULT_DATA_URL);
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "output_dir = \"site\"\n\n[filters]\nstates = [\"Colorado\", \"Texas\"]\n",
        )?;

        let config = load_config(Some(&path))?;
        assert_eq!(config.data_url, DEFAULT_DATA_URL);
        assert_eq!(config.output_dir, PathBuf::from("site"));
        assert_eq!(config.filters.states, vec!["Colorado", "Texas"]);
        assert!(config.filters.product_lines.is_empty());
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "output_dir = [\n")?;
        assert!(load_config(Some(&path)).is_err());
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.filters.product_lines = vec!["Beans".to_string()];

        save_config(&config, Some(&path))?;
        assert_eq!(load_config(Some(&path))?, config);
        Ok(())
    }

    #[test]
    fn test_init_keeps_existing_file_without_force() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");

        init_config(Some(&path), false)?;
        assert_eq!(load_config(Some(&path))?, Config::default());

        fs::write(&path, "output_dir = \"site\"\n")?;
        assert!(init_config(Some(&path), false).is_err());
        assert_eq!(load_config(Some(&path))?.output_dir, PathBuf::from("site"));

        init_config(Some(&path), true)?;
        assert_eq!(load_config(Some(&path))?, Config::default());
        Ok(())
    }

    #[test]
    fn test_filter_defaults_by_dimension() {
        let defaults = FilterDefaults {
            area_codes: vec!["719".to_string()],
            ..FilterDefaults::default()
        };
        assert_eq!(defaults.values(Dimension::AreaCode), ["719"]);
        assert!(defaults.values(Dimension::State).is_empty());
    }
}
