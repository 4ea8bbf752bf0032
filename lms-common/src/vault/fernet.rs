//! Fernet token codec
//!
//! Token layout (before URL-safe base64):
//!
//! ```text
//! 0x80 | timestamp (u64 BE) | IV (16) | AES-128-CBC ciphertext (PKCS7) | HMAC-SHA256 (32)
//! ```
//!
//! The HMAC covers everything before it and is checked before decryption.

use aes::Aes128;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use super::{VaultError, KEY_LEN};

type HmacSha256 = Hmac<Sha256>;
type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

const VERSION: u8 = 0x80;
const HEADER_LEN: usize = 1 + 8 + 16;
const MAC_LEN: usize = 32;
const BLOCK_LEN: usize = 16;

/// Tokens written by other Fernet implementations may or may not carry padding
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// 32-byte Fernet key split into signing and encryption halves
#[derive(Clone, PartialEq, Eq)]
pub struct FernetKey {
    signing: [u8; 16],
    encryption: [u8; 16],
}

impl std::fmt::Debug for FernetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FernetKey(..)")
    }
}

impl FernetKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        let mut signing = [0u8; 16];
        let mut encryption = [0u8; 16];
        signing.copy_from_slice(&bytes[..16]);
        encryption.copy_from_slice(&bytes[16..]);
        Self { signing, encryption }
    }

    /// Parse the URL-safe base64 text form of a key
    pub fn from_base64(text: &str) -> Result<Self, VaultError> {
        let raw = URL_SAFE_LENIENT
            .decode(text.trim())
            .map_err(|_| VaultError::InvalidCredential)?;
        let bytes: [u8; KEY_LEN] = raw.try_into().map_err(|_| VaultError::InvalidCredential)?;
        Ok(Self::from_bytes(bytes))
    }

    /// URL-safe base64 text form of the key
    pub fn to_base64(&self) -> String {
        let mut bytes = [0u8; KEY_LEN];
        bytes[..16].copy_from_slice(&self.signing);
        bytes[16..].copy_from_slice(&self.encryption);
        URL_SAFE.encode(bytes)
    }
}

/// Fernet encrypter/decrypter bound to one key
#[derive(Debug, Clone)]
pub struct Fernet {
    key: FernetKey,
}

impl Fernet {
    pub fn new(key: FernetKey) -> Self {
        Self { key }
    }

    /// Encrypt with the current time and a random IV
    pub fn encrypt(&self, plaintext: &[u8]) -> String {
        let mut iv = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut iv);
        let timestamp = chrono::Utc::now().timestamp().max(0) as u64;
        self.encrypt_with(plaintext, timestamp, iv)
    }

    /// Encrypt with an explicit timestamp and IV
    pub fn encrypt_with(&self, plaintext: &[u8], timestamp: u64, iv: [u8; 16]) -> String {
        let ciphertext = Aes128CbcEnc::new(&self.key.encryption.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut token = Vec::with_capacity(HEADER_LEN + ciphertext.len() + MAC_LEN);
        token.push(VERSION);
        token.extend_from_slice(&timestamp.to_be_bytes());
        token.extend_from_slice(&iv);
        token.extend_from_slice(&ciphertext);

        let tag = self.sign(&token);
        token.extend_from_slice(&tag);

        URL_SAFE.encode(token)
    }

    /// Verify and decrypt a token
    pub fn decrypt(&self, token: &str) -> Result<Vec<u8>, VaultError> {
        let raw = URL_SAFE_LENIENT
            .decode(token.trim())
            .map_err(|_| VaultError::InvalidCredential)?;

        if raw.len() < HEADER_LEN + BLOCK_LEN + MAC_LEN || raw[0] != VERSION {
            return Err(VaultError::InvalidCredential);
        }

        let (signed, tag) = raw.split_at(raw.len() - MAC_LEN);
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key.signing)
            .map_err(|_| VaultError::InvalidCredential)?;
        mac.update(signed);
        mac.verify_slice(tag)
            .map_err(|_| VaultError::InvalidCredential)?;

        let iv = &signed[9..HEADER_LEN];
        let ciphertext = &signed[HEADER_LEN..];
        if ciphertext.len() % BLOCK_LEN != 0 {
            return Err(VaultError::InvalidCredential);
        }

        Aes128CbcDec::new_from_slices(&self.key.encryption, iv)
            .map_err(|_| VaultError::InvalidCredential)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| VaultError::InvalidCredential)
    }

    /// Decrypt a token whose plaintext is UTF-8 text
    pub fn decrypt_text(&self, token: &str) -> Result<String, VaultError> {
        let bytes = self.decrypt(token)?;
        String::from_utf8(bytes).map_err(|_| VaultError::InvalidCredential)
    }

    fn sign(&self, data: &[u8]) -> [u8; MAC_LEN] {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key.signing)
            .expect("HMAC accepts keys of any length");
        mac.update(data);
        let mut tag = [0u8; MAC_LEN];
        tag.copy_from_slice(&mac.finalize().into_bytes());
        tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::derive_key_with_iterations;

    /// Key for passphrase "open-sesame", salt 0..16, 1000 iterations
    const FIXTURE_KEY: &str = "n18PosyUcUPmkBC7qjfCxAIgKXE2QBui73yy_zvIwcQ=";

    /// Produced by the Python `cryptography` Fernet implementation under FIXTURE_KEY
    const FIXTURE_TOKEN: &str = "gAAAAABq0t7D755ya54OsF1Uf0WLe7Wmy5IW2JttR26XSwud0bxXOChsrOimu-i2kOp7TQLQzuhDGbPY5Wfm3z-zfklOqZRj4FuFocGKrMeqgWKOS2AT8cM=";

    fn fixture() -> Fernet {
        Fernet::new(FernetKey::from_base64(FIXTURE_KEY).unwrap())
    }

    #[test]
    fn test_decrypts_reference_token() {
        let plaintext = fixture().decrypt_text(FIXTURE_TOKEN).unwrap();
        assert_eq!(plaintext, "fixture-client-id");
    }

    #[test]
    fn test_decrypts_unpadded_token() {
        let unpadded = FIXTURE_TOKEN.trim_end_matches('=');
        let plaintext = fixture().decrypt_text(unpadded).unwrap();
        assert_eq!(plaintext, "fixture-client-id");
    }

    #[test]
    fn test_round_trip() {
        let fernet = fixture();
        let cases: [&[u8]; 4] = [b"", b"x", b"exactly sixteen!", b"lab,member,uri\nA,b,c\n"];
        for plaintext in cases {
            let token = fernet.encrypt(plaintext);
            assert_eq!(fernet.decrypt(&token).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_deterministic_with_fixed_iv() {
        let fernet = fixture();
        let a = fernet.encrypt_with(b"payload", 1_700_000_000, [7u8; 16]);
        let b = fernet.encrypt_with(b"payload", 1_700_000_000, [7u8; 16]);
        assert_eq!(a, b);
        assert!(a.starts_with("gAAAAA"));
    }

    #[test]
    fn test_wrong_key_is_invalid_credential() {
        let wrong = Fernet::new(derive_key_with_iterations("not-it", &[0u8; 16], 1000));
        assert_eq!(
            wrong.decrypt(FIXTURE_TOKEN),
            Err(VaultError::InvalidCredential)
        );
    }

    #[test]
    fn test_any_tampered_byte_is_rejected() {
        let fernet = fixture();
        let token = fernet.encrypt(b"secret value");
        let raw = URL_SAFE.decode(&token).unwrap();

        for index in 0..raw.len() {
            let mut tampered = raw.clone();
            tampered[index] ^= 0x01;
            let result = fernet.decrypt(&URL_SAFE.encode(&tampered));
            assert_eq!(result, Err(VaultError::InvalidCredential), "byte {}", index);
        }
    }

    #[test]
    fn test_garbage_is_rejected() {
        let fernet = fixture();
        assert_eq!(fernet.decrypt(""), Err(VaultError::InvalidCredential));
        assert_eq!(fernet.decrypt("not base64 !!"), Err(VaultError::InvalidCredential));
        assert_eq!(fernet.decrypt("gAAAAA"), Err(VaultError::InvalidCredential));
    }

    #[test]
    fn test_key_debug_hides_material() {
        let key = FernetKey::from_base64(FIXTURE_KEY).unwrap();
        assert_eq!(format!("{:?}", key), "FernetKey(..)");
        assert_eq!(key.to_base64(), FIXTURE_KEY);
    }
}
