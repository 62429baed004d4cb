//! Config command - read and change settings

use std::path::Path;

use crate::cli::ConfigCommands;
use crate::config::TagsmithConfig;
use crate::{Result, TagsmithError};

/// Execute the config management command
///
/// `path` is the `--config` override; `None` means the default location.
///
/// # Errors
/// Returns `Validation` for malformed settings or unknown keys, and `Config`
/// if the file cannot be written.
pub fn execute(
    mut config: TagsmithConfig,
    path: Option<&Path>,
    command: &ConfigCommands,
    quiet: bool,
) -> Result<()> {
    match command {
        ConfigCommands::Set { setting } => {
            let (key, value) = setting.split_once('=').ok_or_else(|| {
                TagsmithError::Validation(
                    "Invalid format. Use: tagsmith config set key=value".into(),
                )
            })?;
            let key = key.trim();
            config.set(key, value)?;
            let target = match path {
                Some(p) => p.to_path_buf(),
                None => TagsmithConfig::config_path()?,
            };
            config.save_to(&target)?;
            if !quiet {
                println!("Set {key} = {}", config.get(key)?);
            }
        }
        ConfigCommands::Get { key } => {
            println!("{}", config.get(key.trim())?);
        }
        ConfigCommands::Path => match path {
            Some(p) => println!("{}", p.display()),
            None => println!("{}", TagsmithConfig::config_path()?.display()),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_persists_to_given_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let command = ConfigCommands::Set {
            setting: "start_number = 7".into(),
        };
        execute(TagsmithConfig::default(), Some(&path), &command, true).unwrap();
        let loaded = TagsmithConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.start_number, 7);
    }

    #[test]
    fn test_set_requires_key_value() {
        let command = ConfigCommands::Set {
            setting: "quiet".into(),
        };
        let err = execute(TagsmithConfig::default(), None, &command, true).unwrap_err();
        assert!(matches!(err, TagsmithError::Validation(_)));
    }

    #[test]
    fn test_get_unknown_key() {
        let command = ConfigCommands::Get { key: "colour".into() };
        assert!(execute(TagsmithConfig::default(), None, &command, true).is_err());
    }
}
