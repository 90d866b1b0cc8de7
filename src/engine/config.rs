//! Startup configuration, read from a JSON file when one is present.

use std::fs;
use std::io;
use std::path::{ Path, PathBuf };

use log::info;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "DEMO_CONFIG";
/// Looked up in the working directory when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "demo.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },

    #[error("malformed config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub msaa_samples: u8,
    pub resizable: bool,
    pub debug_context: bool,
    pub gles_major: u8,
    pub gles_minor: u8,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Simulation".to_string(),
            width: 1280,
            height: 720,
            msaa_samples: 2,
            resizable: true,
            debug_context: true,
            gles_major: 3,
            gles_minor: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub debug_texture: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self { debug_texture: PathBuf::from("data/debug_tex.png") }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub assets: AssetsConfig,
    pub log_filter: Option<String>,
    pub clear_color: [f32; 4],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetsConfig::default(),
            log_filter: None,
            clear_color: [0.1, 0.1, 0.1, 1.0],
        }
    }
}

impl AppConfig {
    /// Reads the file named by `DEMO_CONFIG`, else `demo.json` if it exists,
    /// else returns the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::from_json(
            r#"{ "window": { "width": 640, "msaa_samples": 0 }, "log_filter": "debug" }"#
        ).unwrap();

        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.msaa_samples, 0);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.window.title, "Simulation");
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
        assert_eq!(config.assets.debug_texture, PathBuf::from("data/debug_tex.png"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AppConfig::from_json(r#"{ "window": { "width": "wide" } }"#).is_err());
        assert!(AppConfig::from_json("{ window").is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = AppConfig::from_file(Path::new("no/such/demo.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
