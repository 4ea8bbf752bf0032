//! Passphrase key derivation

use sha2::Sha256;

use super::FernetKey;

/// PBKDF2 iteration count used by sealed bundles
pub const KDF_ITERATIONS: u32 = 480_000;

/// Derived key length in bytes (16 signing + 16 encryption)
pub const KEY_LEN: usize = 32;

/// Salt length drawn by the sealing utility
pub const SALT_LEN: usize = 16;

/// Derive a Fernet key from a passphrase and salt with the standard iteration count
pub fn derive_key(passphrase: &str, salt: &[u8]) -> FernetKey {
    derive_key_with_iterations(passphrase, salt, KDF_ITERATIONS)
}

/// Derive a Fernet key with an explicit iteration count
pub fn derive_key_with_iterations(passphrase: &str, salt: &[u8], iterations: u32) -> FernetKey {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, iterations.max(1), &mut key);
    FernetKey::from_bytes(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_SALT: [u8; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

    #[test]
    fn test_low_iteration_known_answer() {
        let key = derive_key_with_iterations("open-sesame", &FIXTURE_SALT, 1000);
        assert_eq!(key.to_base64(), "n18PosyUcUPmkBC7qjfCxAIgKXE2QBui73yy_zvIwcQ=");
    }

    #[test]
    fn test_full_iteration_known_answer() {
        let key = derive_key("open-sesame", &FIXTURE_SALT);
        assert_eq!(key.to_base64(), "SjDTWsOBuiAQ-rhn2W8JvNcTWhNeiunE3nPbhUzIx44=");
    }

    #[test]
    fn test_salt_changes_key() {
        let a = derive_key_with_iterations("pw", &[1u8; 16], 10);
        let b = derive_key_with_iterations("pw", &[2u8; 16], 10);
        assert_ne!(a.to_base64(), b.to_base64());
    }
}
