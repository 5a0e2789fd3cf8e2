//! Sealing of seller-supplied passwords.
//!
//! Game and verification passwords are encrypted with AES-256-GCM before they
//! reach the database. The stored form is `base64(nonce || ciphertext)` with a
//! fresh 96-bit nonce per value.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const NONCE_LENGTH: usize = 12;

/// Errors from sealing or opening a credential.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credentials key must be 32 bytes of base64")]
    InvalidKey,
    #[error("failed to encrypt credential")]
    Encrypt,
    #[error("stored credential is malformed")]
    Malformed,
    #[error("failed to decrypt credential")]
    Decrypt,
}

/// Encrypts and decrypts stored passwords.
#[derive(Clone)]
pub struct CredentialCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCipher").finish_non_exhaustive()
    }
}

impl CredentialCipher {
    /// Build a cipher from a base64-encoded 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidKey` if the key is not valid base64
    /// or is not 32 bytes long.
    pub fn from_base64_key(key: &SecretString) -> Result<Self, CredentialError> {
        let bytes = STANDARD
            .decode(key.expose_secret().trim())
            .map_err(|_| CredentialError::InvalidKey)?;
        let cipher = Aes256Gcm::new_from_slice(&bytes).map_err(|_| CredentialError::InvalidKey)?;
        Ok(Self { cipher })
    }

    /// Encrypt a secret for storage.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Encrypt` if encryption fails.
    pub fn seal(&self, secret: &SecretString) -> Result<String, CredentialError> {
        let nonce_bytes: [u8; NONCE_LENGTH] = rand::random();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, secret.expose_secret().as_bytes())
            .map_err(|_| CredentialError::Encrypt)?;

        let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    /// Decrypt a stored value.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Malformed` if the value is not something
    /// [`Self::seal`] produced, or `CredentialError::Decrypt` if it was sealed
    /// with a different key or tampered with.
    pub fn open(&self, sealed: &str) -> Result<SecretString, CredentialError> {
        let bytes = STANDARD
            .decode(sealed)
            .map_err(|_| CredentialError::Malformed)?;
        if bytes.len() < NONCE_LENGTH {
            return Err(CredentialError::Malformed);
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LENGTH);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CredentialError::Decrypt)?;

        let text = String::from_utf8(plaintext).map_err(|_| CredentialError::Malformed)?;
        Ok(SecretString::from(text))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cipher(fill: u8) -> CredentialCipher {
        let key = SecretString::from(STANDARD.encode([fill; 32]));
        CredentialCipher::from_base64_key(&key).unwrap()
    }

    #[test]
    fn test_seal_hides_plaintext_and_opens() {
        let cipher = cipher(7);
        let secret = SecretString::from("correct horse battery".to_string());

        let sealed = cipher.seal(&secret).unwrap();
        assert!(!sealed.contains("correct horse"));
        assert_eq!(
            cipher.open(&sealed).unwrap().expose_secret(),
            "correct horse battery"
        );
    }

    #[test]
    fn test_nonces_differ() {
        let cipher = cipher(7);
        let secret = SecretString::from("same".to_string());
        assert_ne!(cipher.seal(&secret).unwrap(), cipher.seal(&secret).unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = cipher(1)
            .seal(&SecretString::from("pw".to_string()))
            .unwrap();
        assert!(matches!(cipher(2).open(&sealed), Err(CredentialError::Decrypt)));
    }

    #[test]
    fn test_malformed_values() {
        let cipher = cipher(3);
        assert!(matches!(cipher.open("%%%"), Err(CredentialError::Malformed)));
        assert!(matches!(
            cipher.open(&STANDARD.encode([0_u8; 4])),
            Err(CredentialError::Malformed)
        ));
    }

    #[test]
    fn test_bad_keys() {
        let short = SecretString::from(STANDARD.encode([0_u8; 16]));
        assert!(matches!(
            CredentialCipher::from_base64_key(&short),
            Err(CredentialError::InvalidKey)
        ));
        let junk = SecretString::from("not base64!".to_string());
        assert!(CredentialCipher::from_base64_key(&junk).is_err());
    }
}
