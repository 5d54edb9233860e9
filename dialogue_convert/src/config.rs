//! Converter settings and loader.
//!
//! Settings live in a small TOML file (`dialogue_convert.toml` by default):
//!
//! ```toml
//! expand_all = true
//! output_name = "abigail_dialogue.json"
//! validate = false
//! ```
//!
//! Every field is optional. Command line flags take precedence over the file.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ConvertOptions;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "dialogue_convert.toml";
/// File name used when a converted document is downloaded.
pub const DEFAULT_OUTPUT_NAME: &str = "converted_dialogue.json";

/// Complete converter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Copy date, event and gift entries into every tier.
    pub expand_all: bool,
    /// Download file name for converted documents.
    pub output_name: String,
    /// Run document validation after each conversion.
    pub validate: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            expand_all: false,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            validate: true,
        }
    }
}

impl ConverterConfig {
    pub fn options(&self) -> ConvertOptions {
        ConvertOptions {
            expand_all: self.expand_all,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config from '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config from '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Loads the configuration, falling back to defaults on error.
///
/// A missing file is normal and only logged at `info`; an unreadable or
/// malformed one is logged at `warn`. This function never fails.
pub fn load_config(path: &Path) -> ConverterConfig {
    match try_load_config(path) {
        Ok(config) => {
            info!("converter config loaded from '{}'", path.display());
            config
        },
        Err(ConfigError::Read { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            info!("no config at '{}'; using defaults", path.display());
            ConverterConfig::default()
        },
        Err(e) => {
            warn!("{e}. Using defaults.");
            ConverterConfig::default()
        },
    }
}

/// Attempts to load the configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn try_load_config(path: &Path) -> Result<ConverterConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let config = ConverterConfig::default();
        assert!(!config.expand_all);
        assert!(config.validate);
        assert_eq!(config.output_name, "converted_dialogue.json");
        assert_eq!(config.options(), ConvertOptions::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = config_file("expand_all = true\n");
        let config = try_load_config(file.path()).unwrap();
        assert!(config.expand_all);
        assert!(config.validate);
        assert_eq!(config.output_name, DEFAULT_OUTPUT_NAME);
        assert!(config.options().expand_all);
    }

    #[test]
    fn full_file() {
        let file = config_file("expand_all = false\noutput_name = \"abigail.json\"\nvalidate = false\n");
        let config = load_config(file.path());
        assert_eq!(
            config,
            ConverterConfig {
                expand_all: false,
                output_name: "abigail.json".into(),
                validate: false,
            }
        );
    }

    #[test]
    fn malformed_file_falls_back() {
        let file = config_file("expand_all = \"sometimes\"\n");
        assert!(matches!(try_load_config(file.path()), Err(ConfigError::Parse { .. })));
        assert_eq!(load_config(file.path()), ConverterConfig::default());
    }

    #[test]
    fn missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        assert!(matches!(try_load_config(&path), Err(ConfigError::Read { .. })));
        assert_eq!(load_config(&path), ConverterConfig::default());
    }
}
