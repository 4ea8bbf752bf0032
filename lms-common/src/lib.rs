//! # LMS Common Library
//!
//! Shared code for the Lab Music Space binaries:
//! - Error types
//! - Configuration loading (TOML + path resolution)
//! - Tracing initialization
//! - Credential vault (passphrase-derived keys, Fernet tokens, sealed bundles)

pub mod config;
pub mod error;
pub mod logging;
pub mod vault;

pub use error::{Error, Result};
