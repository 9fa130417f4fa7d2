//! Configuration types for emacros.
//!
//! [`GlobalConfig`] is loaded from `~/.emacros/config.yaml` and decides where
//! global definition files live and how definition files are named.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_EXTENSION, DEFAULT_FILE_PREFIX, DEFAULT_SUBDIR, EMACROS_HOME_DIR,
    GLOBAL_CONFIG_FILENAME,
};
use crate::errors::MacroError;
use crate::paths::Scope;

// ============================================================================
// GlobalConfig
// ============================================================================

/// Global (user-level) configuration for emacros.
///
/// # Example YAML
///
/// ```yaml
/// global_dir: /home/me/macros
/// subdir: null            # hidden .emacros-for-<mode>.el files instead
/// default_scope: global
/// reserved_names:
///   - save-buffer
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Global root directory. Defaults to the user home.
    pub global_dir: Option<PathBuf>,

    /// Subdirectory holding `for-<mode>.<ext>` files; `None` selects the
    /// hidden flat layout.
    pub subdir: Option<String>,

    /// Prefix of hidden definition files.
    pub file_prefix: String,

    /// Extension of definition files.
    pub extension: String,

    /// Scope a fresh session offers by default.
    pub default_scope: Scope,

    /// Host command names macros may not shadow.
    pub reserved_names: Vec<String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            global_dir: None,
            subdir: Some(DEFAULT_SUBDIR.to_string()),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            default_scope: Scope::Local,
            reserved_names: Vec::new(),
        }
    }
}

impl GlobalConfig {
    /// Load the global configuration from the default location.
    ///
    /// If the file does not exist, returns a default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MacroError::InvalidConfig`] if the file exists but cannot be
    /// parsed or fails validation.
    pub fn load_default() -> Result<Self, MacroError> {
        match Self::default_path() {
            Some(path) => Self::from_path(&path),
            None => {
                tracing::debug!("Could not determine home directory, using default config");
                Ok(Self::default())
            }
        }
    }

    /// Load the global configuration from a specific path.
    ///
    /// If the file does not exist, returns a default configuration.
    pub fn from_path(path: &Path) -> Result<Self, MacroError> {
        if !path.exists() {
            tracing::debug!("Config not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            MacroError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            MacroError::InvalidConfig(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the default config directory (`~/.emacros`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(EMACROS_HOME_DIR))
    }

    /// Get the default config file path (`~/.emacros/config.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        Self::default_dir().map(|d| d.join(GLOBAL_CONFIG_FILENAME))
    }

    /// Create a configuration rooted at `global_dir`, for tests and embedding.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_dir: Some(global_dir.into()),
            ..Self::default()
        }
    }

    /// The effective global root directory.
    pub fn global_dir(&self) -> PathBuf {
        self.global_dir
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Validate the configuration.
    ///
    /// Returns non-fatal warnings; unusable values are errors.
    pub fn validate(&self) -> Result<Vec<String>, MacroError> {
        let mut warnings = Vec::new();

        if self.file_prefix.trim().is_empty() {
            return Err(MacroError::InvalidConfig(
                "file_prefix must not be empty".to_string(),
            ));
        }
        if self.extension.trim().is_empty() || self.extension.starts_with('.') {
            return Err(MacroError::InvalidConfig(format!(
                "extension `{}` must be non-empty and given without a leading dot",
                self.extension
            )));
        }
        if let Some(subdir) = &self.subdir {
            if subdir.contains('/') || subdir.contains('\\') {
                return Err(MacroError::InvalidConfig(format!(
                    "subdir `{}` must be a single directory name",
                    subdir
                )));
            }
            if subdir.is_empty() {
                warnings.push("subdir is empty; using the hidden flat layout".to_string());
            }
        }
        if let Some(dir) = &self.global_dir {
            if dir.is_relative() {
                warnings.push(format!(
                    "global_dir `{}` is relative; it resolves against the working directory",
                    dir.display()
                ));
            }
        }

        Ok(warnings)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GlobalConfig::default();
        assert_eq!(config.subdir.as_deref(), Some("emacros"));
        assert_eq!(config.file_prefix, "emacros");
        assert_eq!(config.extension, "el");
        assert_eq!(config.default_scope, Scope::Local);
    }

    #[test]
    fn test_config_from_yaml_disables_subdir() {
        let yaml = "global_dir: /home/u\nsubdir: null\ndefault_scope: global\n";
        let config: GlobalConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.subdir.is_none());
        assert_eq!(config.global_dir(), PathBuf::from("/home/u"));
        assert_eq!(config.default_scope, Scope::Global);
        assert_eq!(config.extension, "el");
    }

    #[test]
    fn test_config_missing_file() {
        let temp = TempDir::new().unwrap();
        let config = GlobalConfig::from_path(&temp.path().join("nope.yaml")).unwrap();
        assert_eq!(config.file_prefix, "emacros");
    }

    #[test]
    fn test_config_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "subdir: [broken").unwrap();
        let err = GlobalConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, MacroError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_validation() {
        let bad = GlobalConfig {
            extension: ".el".into(),
            ..GlobalConfig::default()
        };
        assert!(bad.validate().is_err());

        let nested = GlobalConfig {
            subdir: Some("a/b".into()),
            ..GlobalConfig::default()
        };
        assert!(nested.validate().is_err());

        let relative = GlobalConfig {
            global_dir: Some(PathBuf::from("macros")),
            ..GlobalConfig::default()
        };
        assert_eq!(relative.validate().unwrap().len(), 1);
    }
}
