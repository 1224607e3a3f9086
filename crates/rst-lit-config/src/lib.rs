//! File-backed configuration for rst-lit hosts: markup toggles, title
//! style characters, and the interpreter used as execution target.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Interpreter the execution backend pipes snippets to.
    #[serde(default = "default_interpreter")]
    pub interpreter: PathBuf,
    /// Hide comment markers and underlines of title blocks.
    #[serde(default)]
    pub hide_title_markup: bool,
    /// Hide the backtick delimiters of quoted spans.
    #[serde(default = "default_true")]
    pub hide_quotes: bool,
    /// Reveal title markup while the cursor is inside it.
    #[serde(default)]
    pub reveal_at_point: bool,
    /// Underline style characters, in level order.
    #[serde(default = "default_title_styles")]
    pub title_styles: String,
}

fn default_interpreter() -> PathBuf {
    PathBuf::from("python3")
}

fn default_true() -> bool {
    true
}

fn default_title_styles() -> String {
    "=-~".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            hide_title_markup: false,
            hide_quotes: true,
            reveal_at_point: false,
            title_styles: default_title_styles(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the interpreter path
        config.interpreter = Self::expand_path(&config.interpreter).unwrap_or(config.interpreter);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/rst-lit");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// The title style characters as an ordered list.
    pub fn title_style_chars(&self) -> Vec<char> {
        self.title_styles.chars().collect()
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
