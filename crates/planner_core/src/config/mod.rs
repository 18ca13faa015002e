use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "planner";
const CONFIG_FILE_NAME: &str = "config.json";
const DATA_DIR_NAME: &str = "db";
const DEFAULT_REPORT_DIR: &str = "out";

pub const CONFIG_ENV_VAR: &str = "PLANNER_CONFIG_PATH";
pub const DATA_DIR_ENV_VAR: &str = "PLANNER_DATA_DIR";
pub const REPORT_DIR_ENV_VAR: &str = "PLANNER_REPORT_DIR";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
}

/// Directories the planner actually uses once config, overrides and
/// environment have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub report_dir: PathBuf,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Some(path) = env_path(CONFIG_ENV_VAR) {
        return Ok(path);
    }
    Ok(app_dir()?.join(CONFIG_FILE_NAME))
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(data_dir) = overrides.data_dir.as_ref() {
        merged.data_dir = Some(data_dir.clone());
    }
    if let Some(report_dir) = overrides.report_dir.as_ref() {
        merged.report_dir = Some(report_dir.clone());
    }
    merged
}

/// Environment variables win over the config, which wins over defaults.
pub fn resolve_settings(config: &Config) -> Result<Settings, AppError> {
    let data_dir = match env_path(DATA_DIR_ENV_VAR).or_else(|| config.data_dir.clone()) {
        Some(path) => path,
        None => app_dir()?.join(DATA_DIR_NAME),
    };
    let report_dir = env_path(REPORT_DIR_ENV_VAR)
        .or_else(|| config.report_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR));

    Ok(Settings {
        data_dir,
        report_dir,
    })
}

/// Lowercases a config key and folds runs of punctuation into `_`, so
/// `Data-Dir` and `data dir` both become `data_dir`.
pub fn canonical_key(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

fn app_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}
