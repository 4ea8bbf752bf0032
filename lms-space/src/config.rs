//! Configuration for lms-space
//!
//! Resolution order per setting: command line → environment → TOML file →
//! built-in default. The TOML file itself is located by
//! [`lms_common::config::resolve_config_path`].

use lms_common::config::{load_toml_or_default, resolve_config_path, LoggingConfig};
use lms_common::vault::SealedBundle;
use lms_common::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::embedding::EmbeddingSettings;
use crate::services::CatalogEndpoints;

pub const MODULE_NAME: &str = "lms-space";
pub const DEFAULT_PORT: u16 = 5780;
pub const CONFIG_ENV_VAR: &str = "LMS_SPACE_CONFIG";

/// Service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
    pub port: u16,
    pub bind_address: String,
    /// Sealed bundle file; the compiled-in bundle is used when absent
    pub bundle_path: Option<PathBuf>,
    pub catalog: CatalogEndpoints,
    /// Embedding used at unlock
    pub embedding: EmbeddingSettings,
    pub logging: LoggingConfig,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: "127.0.0.1".to_string(),
            bundle_path: None,
            catalog: CatalogEndpoints::default(),
            embedding: EmbeddingSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SpaceConfig {
    /// Load the config file (CLI path, then `LMS_SPACE_CONFIG`, then platform default)
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(cli_path, CONFIG_ENV_VAR, MODULE_NAME);
        if let Some(path) = &path {
            info!(path = %path.display(), "Loading configuration");
        }
        load_toml_or_default(path.as_deref())
    }

    /// Apply command-line / environment overrides on top of file values
    pub fn with_overrides(mut self, port: Option<u16>, bundle_path: Option<PathBuf>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        if bundle_path.is_some() {
            self.bundle_path = bundle_path;
        }
        self
    }

    /// Bundle file if configured, otherwise the compiled-in bundle
    pub fn load_bundle(&self) -> Result<SealedBundle> {
        match &self.bundle_path {
            Some(path) => {
                info!(path = %path.display(), "Using sealed bundle file");
                SealedBundle::load(path)
            }
            None => Ok(crate::sealed::default_bundle()),
        }
    }
}
