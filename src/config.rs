use anyhow::{bail, ensure, Context, Result};
use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_CONFIG_RAW: &str = include_str!("../config/default.toml");

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConverterConfig {
    pub enabled: bool,
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: String::from("https://www.pokedata.ovh/misc/cardmarket"),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub cache_file: PathBuf,
    pub catalogue_pattern: String,
    pub purchase_pattern: String,
    pub variant_markers: Vec<String>,
    pub converter: ConverterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("."),
            cache_file: PathBuf::from("card_data.json"),
            catalogue_pattern: String::from("TCG Collector"),
            purchase_pattern: String::from("Cardmarket"),
            variant_markers: vec![String::from("Reverse Holo"), String::from("Holo")],
            converter: ConverterConfig::default(),
        }
    }
}

pub fn get_config_dir() -> Result<PathBuf> {
    match ProjectDirs::from("", "", env!("CARGO_PKG_NAME")) {
        Some(dirs) => Ok(dirs.config_dir().to_path_buf()),
        None => bail!("could not determine a config directory for this platform"),
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

impl Config {
    /// Loads `path` when given, otherwise the user config file if present,
    /// otherwise the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        if let Some(path) = path {
            ensure!(path.exists(), "config file not found: {}", path.display());
            return Self::load_from_file(path);
        }

        let default_path = default_config_path()?;
        if default_path.exists() {
            return Self::load_from_file(&default_path);
        }

        debug!("no config file, using built-in defaults");
        Self::parse(DEFAULT_CONFIG_RAW)
    }

    pub fn load_from_file(path: &Path) -> Result<Config> {
        info!("load config from: {}", path.display());

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid config: {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Config> {
        let config: Config = toml::from_str(raw)?;
        ensure!(
            !config.catalogue_pattern.is_empty() && !config.purchase_pattern.is_empty(),
            "file name patterns must not be empty"
        );
        ensure!(
            config.catalogue_pattern != config.purchase_pattern,
            "catalogue and purchase patterns must differ"
        );
        ensure!(
            config.variant_markers.iter().all(|m| !m.trim().is_empty()),
            "variant markers must not be blank"
        );
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Writes the default config file unless one already exists.
pub fn initialize_config() -> Result<PathBuf> {
    let path = default_config_path()?;
    if path.exists() {
        debug!("config already exists at `{}`", path.display());
        return Ok(path);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, DEFAULT_CONFIG_RAW)?;
    info!("wrote default config to `{}`", path.display());
    Ok(path)
}
