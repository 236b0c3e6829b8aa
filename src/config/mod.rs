use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::crop::AspectRatio;
use crate::sync::DEFAULT_RATIO_TEXT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigPathError {
    #[error("neither XDG_CONFIG_HOME nor HOME is set")]
    MissingHomeDirectory,
}

const APP_DIR: &str = "dragcrop";
const APP_CONFIG_FILE: &str = "config.json";

pub const DEFAULT_HIT_THRESHOLD_PX: f64 = 15.0;
pub const DEFAULT_RATIO_FILL: f64 = 1.0;

/// Engine settings from `config.json`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Handle grab distance in display pixels.
    pub hit_threshold_px: f64,
    pub default_ratio: String,
    pub ratio_lock: bool,
    /// Fraction of the fitted box kept by ratio resets, in `(0, 1]`.
    pub ratio_fill: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hit_threshold_px: DEFAULT_HIT_THRESHOLD_PX,
            default_ratio: DEFAULT_RATIO_TEXT.to_string(),
            ratio_lock: false,
            ratio_fill: DEFAULT_RATIO_FILL,
        }
    }
}

impl EngineConfig {
    /// Replaces out-of-range values with their defaults.
    pub fn sanitized(mut self) -> Self {
        if !(self.hit_threshold_px.is_finite() && self.hit_threshold_px >= 0.0) {
            tracing::warn!(
                value = self.hit_threshold_px,
                "invalid hit_threshold_px; using default"
            );
            self.hit_threshold_px = DEFAULT_HIT_THRESHOLD_PX;
        }
        if !(self.ratio_fill.is_finite() && self.ratio_fill > 0.0 && self.ratio_fill <= 1.0) {
            tracing::warn!(value = self.ratio_fill, "invalid ratio_fill; using default");
            self.ratio_fill = DEFAULT_RATIO_FILL;
        }
        if let Err(err) = AspectRatio::parse(&self.default_ratio) {
            tracing::warn!(%err, "invalid default_ratio; using default");
            self.default_ratio = DEFAULT_RATIO_TEXT.to_string();
        }
        self
    }
}

pub fn load_engine_config() -> EngineConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_engine_config_with(xdg_config_home.as_deref(), home.as_deref())
}

pub fn load_engine_config_with(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> EngineConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!(%err, "no config directory; using defaults");
            return EngineConfig::default();
        }
    };
    if !path.exists() {
        return EngineConfig::default();
    }
    let config = match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            EngineConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            EngineConfig::default()
        }
    };
    config.sanitized()
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
