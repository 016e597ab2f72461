//! Lowering configuration loaded from TOML

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Options of a lowering session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowerConfig {
    /// Name of the produced module fragment
    pub module_name: String,

    /// Constant value translation
    pub constants: ConstantsConfig,

    /// Call translation
    pub calls: CallsConfig,

    /// Checks run after stub generation
    pub verify: VerifyConfig,
}

impl Default for LowerConfig {
    fn default() -> Self {
        Self {
            module_name: "main".to_string(),
            constants: ConstantsConfig::default(),
            calls: CallsConfig::default(),
            verify: VerifyConfig::default(),
        }
    }
}

/// How enum entry and class literal constants are translated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralPolicy {
    /// Enum entries become accesses, class literals become class references
    #[default]
    Complete,
    /// Both are dropped with a warning
    Unsupported,
}

/// `[constants]` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantsConfig {
    /// What to do with enum and class literal constants
    pub enum_and_class_literals: LiteralPolicy,
}

/// `[calls]` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallsConfig {
    /// Materialize named arguments written out of order into temporaries
    pub reorder_arguments: bool,
}

impl Default for CallsConfig {
    fn default() -> Self {
        Self {
            reorder_arguments: true,
        }
    }
}

/// `[verify]` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Walk the finished tree and require every referenced symbol to be bound
    pub bound_symbols: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            bound_symbols: true,
        }
    }
}

/// Errors loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file {}", path.display())]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("failed to parse config file {}", path.display())]
    Parse {
        /// Path that was read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
}

impl LowerConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the text is malformed
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid configuration
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_empty() {
        let config = LowerConfig::from_toml("").unwrap();
        assert_eq!(config, LowerConfig::default());
        assert!(config.calls.reorder_arguments);
        assert!(config.verify.bound_symbols);
        assert_eq!(config.constants.enum_and_class_literals, LiteralPolicy::Complete);
    }

    #[test]
    fn test_partial_sections() {
        let config = LowerConfig::from_toml(
            r#"
module_name = "app"

[constants]
enum_and_class_literals = "unsupported"
"#,
        )
        .unwrap();
        assert_eq!(config.module_name, "app");
        assert_eq!(
            config.constants.enum_and_class_literals,
            LiteralPolicy::Unsupported
        );
        assert!(config.calls.reorder_arguments);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[calls]\nreorder_arguments = false").unwrap();
        let config = LowerConfig::from_file(file.path()).unwrap();
        assert!(!config.calls.reorder_arguments);
        assert_eq!(config.module_name, "main");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = LowerConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
