use mlang_engine::{EngineError, LanguageList};
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

    #[error("Invalid languages_json in {config_path}: {source}")]
    LanguagesError {
        config_path: PathBuf,
        source: EngineError,
    },
}

/// Editor integration settings.
///
/// ```toml
/// capability = true
///
/// [[languages]]
/// code = "en"
/// label = "English"
///
/// [[languages]]
/// code = "es"
/// label = "Español"
/// ```
///
/// The language list may instead be given in the attribute form,
/// `languages_json = '{"en":"English","es":"Español"}'`, which takes
/// precedence when both are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Whether the marker engine attaches to the editor at all.
    #[serde(default = "default_capability")]
    pub capability: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages_json: Option<String>,

    #[serde(default)]
    pub languages: LanguageList,
}

fn default_capability() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capability: default_capability(),
            languages_json: None,
            languages: LanguageList::default(),
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

        config.resolve_languages_json(config_path)?;

        if config.languages.is_empty() {
            log::warn!(
                "No languages configured in {}, the toolbar menu will be empty",
                config_path.display()
            );
        }

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load from `config_path`, or the default location when `None`, falling
    /// back to [`Config::default`] when the file does not exist.
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let loaded = match config_path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::load()?,
        };
        Ok(loaded.unwrap_or_default())
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
        let config_dir = shellexpand::tilde("~/.config/mlang");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Replace `languages` with the parsed attribute form, if present.
    fn resolve_languages_json(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        let Some(json) = self.languages_json.take() else {
            return Ok(());
        };

        self.languages =
            LanguageList::from_json(&json).map_err(|source| ConfigError::LanguagesError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        Ok(())
    }
}
