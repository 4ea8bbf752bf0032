//! Credential vault
//!
//! Recovers the catalog service credentials and the dataset from at-rest
//! ciphertext. A symmetric key is derived from the user's passphrase
//! (PBKDF2-HMAC-SHA256) and used to open Fernet tokens
//! (AES-128-CBC + HMAC-SHA256 with a timestamp header).
//!
//! Every failure is reported as [`VaultError::InvalidCredential`]: callers
//! cannot tell a wrong passphrase from a corrupted token.

mod bundle;
mod fernet;
mod kdf;

pub use bundle::{SealedBundle, UnsealedPayload};
pub use fernet::{Fernet, FernetKey};
pub use kdf::{derive_key, derive_key_with_iterations, KDF_ITERATIONS, KEY_LEN, SALT_LEN};

use thiserror::Error;

/// Vault errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Wrong passphrase or corrupted ciphertext
    #[error("invalid credential")]
    InvalidCredential,
}
