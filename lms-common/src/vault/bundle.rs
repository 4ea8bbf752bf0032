//! Sealed bundle: salt plus three Fernet tokens (service id, service secret, dataset)

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{derive_key_with_iterations, Fernet, VaultError, KDF_ITERATIONS};
use crate::config::{load_toml, write_toml};

fn default_iterations() -> u32 {
    KDF_ITERATIONS
}

/// At-rest payload as written by `lms-seal`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SealedBundle {
    /// KDF salt, standard base64
    pub salt: String,
    /// PBKDF2 iteration count
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Fernet token of the catalog client id
    pub service_id: String,
    /// Fernet token of the catalog client secret
    pub service_secret: String,
    /// Fernet token of the dataset CSV text
    pub dataset: String,
}

/// Decrypted bundle contents, kept in memory only
#[derive(Clone, PartialEq, Eq)]
pub struct UnsealedPayload {
    pub service_id: String,
    pub service_secret: String,
    pub dataset: String,
}

impl std::fmt::Debug for UnsealedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsealedPayload")
            .field("service_id", &self.service_id)
            .field("service_secret", &"<redacted>")
            .field("dataset_len", &self.dataset.len())
            .finish()
    }
}

impl SealedBundle {
    /// Encrypt a payload under a passphrase-derived key
    pub fn seal(
        passphrase: &str,
        salt: &[u8],
        iterations: u32,
        payload: &UnsealedPayload,
    ) -> Self {
        let fernet = Fernet::new(derive_key_with_iterations(passphrase, salt, iterations));
        Self {
            salt: STANDARD.encode(salt),
            iterations,
            service_id: fernet.encrypt(payload.service_id.as_bytes()),
            service_secret: fernet.encrypt(payload.service_secret.as_bytes()),
            dataset: fernet.encrypt(payload.dataset.as_bytes()),
        }
    }

    /// Derive the key and decrypt all three tokens.
    ///
    /// A malformed salt, wrong passphrase or corrupted token all yield
    /// [`VaultError::InvalidCredential`].
    pub fn unseal(&self, passphrase: &str) -> Result<UnsealedPayload, VaultError> {
        let salt = STANDARD
            .decode(self.salt.trim())
            .map_err(|_| VaultError::InvalidCredential)?;
        let fernet = Fernet::new(derive_key_with_iterations(passphrase, &salt, self.iterations));

        Ok(UnsealedPayload {
            service_id: fernet.decrypt_text(&self.service_id)?,
            service_secret: fernet.decrypt_text(&self.service_secret)?,
            dataset: fernet.decrypt_text(&self.dataset)?,
        })
    }

    pub fn load(path: &Path) -> crate::Result<Self> {
        load_toml(path)
    }

    pub fn save(&self, path: &Path) -> crate::Result<()> {
        write_toml(self, path)
    }

    pub fn to_toml_string(&self) -> crate::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("Serialize bundle failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> UnsealedPayload {
        UnsealedPayload {
            service_id: "client-id".to_string(),
            service_secret: "client-secret".to_string(),
            dataset: "lab,member,uri\nAlpha,ann,spotify:track:4uLU6hMCjMI75M1A2tKUQC\n".to_string(),
        }
    }

    #[test]
    fn test_seal_unseal_round_trip() {
        let bundle = SealedBundle::seal("hunter2", &[9u8; 16], 100, &payload());
        assert_eq!(bundle.unseal("hunter2").unwrap(), payload());
    }

    #[test]
    fn test_wrong_passphrase_never_yields_plaintext() {
        let bundle = SealedBundle::seal("hunter2", &[9u8; 16], 100, &payload());
        for guess in ["", "hunter", "hunter3", "Hunter2", "hunter2 "] {
            assert_eq!(bundle.unseal(guess), Err(VaultError::InvalidCredential));
        }
    }

    #[test]
    fn test_bad_salt_is_invalid_credential() {
        let mut bundle = SealedBundle::seal("hunter2", &[9u8; 16], 100, &payload());
        bundle.salt = "***".to_string();
        assert_eq!(bundle.unseal("hunter2"), Err(VaultError::InvalidCredential));
    }

    #[test]
    fn test_decrypts_reference_dataset_token() {
        // Python cryptography: PBKDF2(open-sesame, salt 0..16, 1000) + Fernet
        let bundle = SealedBundle {
            salt: STANDARD.encode((0u8..16).collect::<Vec<u8>>()),
            iterations: 1000,
            service_id: "gAAAAABq0t7D755ya54OsF1Uf0WLe7Wmy5IW2JttR26XSwud0bxXOChsrOimu-i2kOp7TQLQzuhDGbPY5Wfm3z-zfklOqZRj4FuFocGKrMeqgWKOS2AT8cM=".to_string(),
            service_secret: "gAAAAABq0t7D755ya54OsF1Uf0WLe7Wmy5IW2JttR26XSwud0bxXOChsrOimu-i2kOp7TQLQzuhDGbPY5Wfm3z-zfklOqZRj4FuFocGKrMeqgWKOS2AT8cM=".to_string(),
            dataset: "gAAAAABq0t7DwY2_r-08TWGtykaw-qguxRDqOxrEG0qmmBlcGSdo4xPzPVHKrSqDzvWDT3hByzWflkeL2ejym7e92Oie-lKtOB1e2xIhdqyr4nyQ2P-Ne8mrI2nXcRlrczMnOeEMPC7FMFsTKyiNuNE6B-6w3rHzdQ==".to_string(),
        };

        let unsealed = bundle.unseal("open-sesame").unwrap();
        assert_eq!(unsealed.service_id, "fixture-client-id");
        assert_eq!(
            unsealed.dataset,
            "lab,member,uri\nAlpha,ann,spotify:track:4uLU6hMCjMI75M1A2tKUQC\n"
        );
    }

    #[test]
    fn test_toml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.toml");
        let bundle = SealedBundle::seal("pw", &[1u8; 16], 10, &payload());

        bundle.save(&path).unwrap();
        assert_eq!(SealedBundle::load(&path).unwrap(), bundle);
    }

    #[test]
    fn test_iterations_default_when_absent() {
        let text = "salt = \"AAAA\"\nservice_id = \"a\"\nservice_secret = \"b\"\ndataset = \"c\"\n";
        let bundle: SealedBundle = toml::from_str(text).unwrap();
        assert_eq!(bundle.iterations, KDF_ITERATIONS);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let text = format!("{:?}", payload());
        assert!(!text.contains("client-secret"));
        assert!(text.contains("client-id"));
    }
}
