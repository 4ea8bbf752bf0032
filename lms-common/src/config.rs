//! Configuration loading and config file resolution

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Logging section shared by every LMS configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset (e.g. "info", "lms_space=debug")
    pub level: String,
    /// Include the event target (module path) in log lines
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: true,
        }
    }
}

/// Config file resolution following the priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Platform config directory (`<config_dir>/lms/<module>.toml`), if it exists
///
/// Returns `None` when no config file applies; callers fall back to defaults.
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    module_name: &str,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform default, only if present
    default_config_path(module_name).filter(|p| p.exists())
}

/// Get default configuration file path for the platform
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        // ~/.config/lms/<module>.toml first, then /etc/lms/<module>.toml
        let file_name = format!("{}.toml", module_name);
        let user_config = dirs::config_dir().map(|d| d.join("lms").join(&file_name));
        let system_config = PathBuf::from("/etc/lms").join(&file_name);

        match user_config {
            Some(path) if path.exists() => Some(path),
            _ if system_config.exists() => Some(system_config),
            other => other,
        }
    } else {
        dirs::config_dir().map(|d| d.join("lms").join(format!("{}.toml", module_name)))
    }
}

/// Load and deserialize a TOML file
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load a TOML file if a path resolved, otherwise return the type's defaults
pub fn load_toml_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) => load_toml(path),
        None => Ok(T::default()),
    }
}

/// Serialize a value to TOML and write it atomically (temp file + rename)
pub fn write_toml<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(value)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        port: u16,
        logging: LoggingConfig,
    }

    #[test]
    #[serial]
    fn test_cli_argument_wins() {
        std::env::set_var("LMS_TEST_CONFIG", "/from/env.toml");
        let resolved = resolve_config_path(
            Some(Path::new("/from/cli.toml")),
            "LMS_TEST_CONFIG",
            "lms-test",
        );
        std::env::remove_var("LMS_TEST_CONFIG");

        assert_eq!(resolved, Some(PathBuf::from("/from/cli.toml")));
    }

    #[test]
    #[serial]
    fn test_env_fallback() {
        std::env::set_var("LMS_TEST_CONFIG", "/from/env.toml");
        let resolved = resolve_config_path(None, "LMS_TEST_CONFIG", "lms-test");
        std::env::remove_var("LMS_TEST_CONFIG");

        assert_eq!(resolved, Some(PathBuf::from("/from/env.toml")));
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sample.toml");
        let sample = Sample {
            port: 8123,
            logging: LoggingConfig {
                level: "debug".to_string(),
                with_target: false,
            },
        };

        write_toml(&sample, &path).unwrap();
        let loaded: Sample = load_toml(&path).unwrap();

        assert_eq!(loaded, sample);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "port = 9000\n").unwrap();

        let loaded: Sample = load_toml(&path).unwrap();
        assert_eq!(loaded.port, 9000);
        assert_eq!(loaded.logging, LoggingConfig::default());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "port = [unterminated").unwrap();

        let err = load_toml::<Sample>(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
