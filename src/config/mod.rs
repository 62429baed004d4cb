//! Configuration module for tagsmith
//!
//! Holds the defaults the CLI falls back to when a flag is not given.
//! Configuration is stored in the user's config directory
//! (`~/.config/tagsmith/config.toml` on Linux) unless `--config` points elsewhere.

use std::fs;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::batch::ExecutionMode;
use crate::dataset::{DEFAULT_IMAGE_EXTENSIONS, FolderSource, TagExtension};
use crate::tags::parse_list;
use crate::{Result, TagsmithError};

/// Keys accepted by `config get` / `config set`
pub const KEYS: &[&str] = &[
    "tag_extension",
    "image_extensions",
    "quiet",
    "parallel",
    "start_number",
    "frequency_limit",
    "process.apply_rules",
    "process.randomize",
    "process.renumber",
    "process.consolidate",
    "process.remove_redundant",
    "process.replace",
];

fn default_image_extensions() -> Vec<String> {
    DEFAULT_IMAGE_EXTENSIONS
        .iter()
        .map(|e| (*e).to_string())
        .collect()
}

const fn default_start_number() -> u64 {
    1
}

/// Steps `process` runs when none are selected on the command line
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ProcessDefaults {
    pub apply_rules: bool,
    pub randomize: bool,
    pub renumber: bool,
    pub consolidate: bool,
    pub remove_redundant: bool,
    pub replace: bool,
}

impl ProcessDefaults {
    #[must_use]
    pub const fn any(&self) -> bool {
        self.apply_rules
            || self.randomize
            || self.renumber
            || self.consolidate
            || self.remove_redundant
            || self.replace
    }
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TagsmithConfig {
    /// Tag file extension read and written
    #[serde(default)]
    pub tag_extension: TagExtension,

    /// Extensions recognised as dataset images
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,

    /// Spread batch work over all cores
    #[serde(default)]
    pub parallel: bool,

    /// First number used when renumbering
    #[serde(default = "default_start_number")]
    pub start_number: u64,

    /// Default number of rows in a frequency report
    #[serde(default)]
    pub frequency_limit: Option<usize>,

    #[serde(default)]
    pub process: ProcessDefaults,
}

impl Default for TagsmithConfig {
    fn default() -> Self {
        Self {
            tag_extension: TagExtension::default(),
            image_extensions: default_image_extensions(),
            quiet: false,
            parallel: false,
            start_number: default_start_number(),
            frequency_limit: None,
            process: ProcessDefaults::default(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value.parse::<bool>().map_err(|_| {
        TagsmithError::Validation(format!(
            "Invalid value for {key}: '{value}'. Use 'true' or 'false'"
        ))
    })
}

fn unknown_key(key: &str) -> TagsmithError {
    TagsmithError::Validation(format!(
        "Unknown configuration key: '{key}'. Available keys: {}",
        KEYS.join(", ")
    ))
}

impl TagsmithConfig {
    /// Get the path to the default config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> std::result::Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::Message("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("tagsmith").join("config.toml"))
    }

    /// Load the configuration from `path`, or from [`Self::config_path`] when
    /// `None`. A missing file is created with the default settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load(path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        let settings = Config::builder()
            .add_source(File::from(config_path).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> std::result::Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Dataset source built from the extension settings
    #[must_use]
    pub fn source(&self, extension: Option<TagExtension>) -> FolderSource {
        FolderSource::new(extension.unwrap_or(self.tag_extension))
            .with_image_extensions(&self.image_extensions)
    }

    #[must_use]
    pub const fn execution_mode(&self, parallel: bool) -> ExecutionMode {
        if parallel || self.parallel {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Sequential
        }
    }

    /// Current value of `key` as text
    ///
    /// # Errors
    /// Returns `Validation` for an unknown key.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "tag_extension" => self.tag_extension.as_str().to_string(),
            "image_extensions" => self.image_extensions.join(", "),
            "quiet" => self.quiet.to_string(),
            "parallel" => self.parallel.to_string(),
            "start_number" => self.start_number.to_string(),
            "frequency_limit" => self
                .frequency_limit
                .map_or_else(|| "none".to_string(), |n| n.to_string()),
            "process.apply_rules" => self.process.apply_rules.to_string(),
            "process.randomize" => self.process.randomize.to_string(),
            "process.renumber" => self.process.renumber.to_string(),
            "process.consolidate" => self.process.consolidate.to_string(),
            "process.remove_redundant" => self.process.remove_redundant.to_string(),
            "process.replace" => self.process.replace.to_string(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Parse `value` and store it under `key`
    ///
    /// # Errors
    /// Returns `Validation` for an unknown key or a value of the wrong shape.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "tag_extension" => {
                self.tag_extension = match value.trim_start_matches('.') {
                    "txt" => TagExtension::Txt,
                    "caption" => TagExtension::Caption,
                    _ => {
                        return Err(TagsmithError::Validation(format!(
                            "Invalid value for tag_extension: '{value}'. Use 'txt' or 'caption'"
                        )));
                    }
                };
            }
            "image_extensions" => {
                let list = parse_list(value);
                if list.is_empty() {
                    return Err(TagsmithError::Validation(
                        "image_extensions needs at least one extension".into(),
                    ));
                }
                self.image_extensions = list
                    .iter()
                    .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                    .collect();
            }
            "quiet" => self.quiet = parse_bool(key, value)?,
            "parallel" => self.parallel = parse_bool(key, value)?,
            "start_number" => {
                let n = value.parse::<u64>().ok().filter(|n| *n >= 1).ok_or_else(|| {
                    TagsmithError::Validation(format!(
                        "Invalid value for start_number: '{value}'. Use a whole number of at least 1"
                    ))
                })?;
                self.start_number = n;
            }
            "frequency_limit" => {
                self.frequency_limit = if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(value.parse::<usize>().map_err(|_| {
                        TagsmithError::Validation(format!(
                            "Invalid value for frequency_limit: '{value}'. Use a number or 'none'"
                        ))
                    })?)
                };
            }
            "process.apply_rules" => self.process.apply_rules = parse_bool(key, value)?,
            "process.randomize" => self.process.randomize = parse_bool(key, value)?,
            "process.renumber" => self.process.renumber = parse_bool(key, value)?,
            "process.consolidate" => self.process.consolidate = parse_bool(key, value)?,
            "process.remove_redundant" => self.process.remove_redundant = parse_bool(key, value)?,
            "process.replace" => self.process.replace = parse_bool(key, value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}
