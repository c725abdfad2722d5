// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Credential Vault: converts plaintext API keys into a storage-safe
//! `(ciphertext, iv)` pair and back.
//!
//! One key is fixed for the life of the process. The AES key schedule is
//! built once at construction, so a constructed vault can never hold a key of
//! the wrong width and `encrypt` never has to re-check it.

use postpilot_config::model::{VaultConfig, ENCRYPTION_KEY_LEN};
use postpilot_core::PostpilotError;
use ring::aead::LessSafeKey;
use ring::rand::SystemRandom;
use secrecy::SecretString;
use zeroize::Zeroizing;

use crate::crypto;

/// The process-wide symmetric key, exactly 32 bytes.
pub struct EncryptionKey(Zeroizing<[u8; ENCRYPTION_KEY_LEN]>);

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey([REDACTED])")
    }
}

impl EncryptionKey {
    pub fn from_bytes(bytes: [u8; ENCRYPTION_KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Take the key from its configured text form.
    ///
    /// The UTF-8 bytes of `value` are used directly as key material, so the
    /// width rule counts bytes, not characters.
    pub fn from_config_value(value: &str) -> Result<Self, PostpilotError> {
        let bytes = value.as_bytes();
        let key: [u8; ENCRYPTION_KEY_LEN] = bytes.try_into().map_err(|_| {
            PostpilotError::Config(format!(
                "ENCRYPTION_KEY must be exactly {ENCRYPTION_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::from_bytes(key))
    }

    /// A fresh random key. Used by tests and one-off tooling.
    pub fn generate() -> Result<Self, PostpilotError> {
        Ok(Self::from_bytes(crypto::generate_random_key()?))
    }
}

/// The result of one encryption: ciphertext (with GCM tag) and its iv.
///
/// The two fields are only meaningful together.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedSecret {
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
}

impl std::fmt::Debug for SealedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedSecret")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("iv_len", &self.iv.len())
            .finish()
    }
}

/// Stateless encrypt/decrypt boundary over one immutable key.
pub struct CredentialVault {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl std::fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl CredentialVault {
    pub fn new(key: EncryptionKey) -> Result<Self, PostpilotError> {
        Ok(Self {
            key: crypto::make_key(&key.0)?,
            rng: SystemRandom::new(),
        })
    }

    /// Build the vault from the `[vault]` config section.
    ///
    /// Fails with [`PostpilotError::Config`] when the key is absent or not
    /// exactly 32 bytes. Call this at startup, before serving anything.
    pub fn from_config(config: &VaultConfig) -> Result<Self, PostpilotError> {
        let value = config.encryption_key.as_deref().ok_or_else(|| {
            PostpilotError::Config("ENCRYPTION_KEY is required".to_string())
        })?;
        Self::new(EncryptionKey::from_config_value(value)?)
    }

    /// Encrypt a plaintext secret under a fresh random iv.
    pub fn encrypt(&self, plaintext: &str) -> Result<SealedSecret, PostpilotError> {
        if plaintext.is_empty() {
            return Err(PostpilotError::Internal(
                "refusing to encrypt an empty secret".to_string(),
            ));
        }
        let (ciphertext, iv) = crypto::seal(&self.key, &self.rng, plaintext.as_bytes())?;
        Ok(SealedSecret {
            ciphertext,
            iv: iv.to_vec(),
        })
    }

    /// Recover the plaintext of a pair produced by [`encrypt`](Self::encrypt)
    /// under the same key.
    pub fn decrypt(&self, sealed: &SealedSecret) -> Result<SecretString, PostpilotError> {
        let plaintext = crypto::open(&self.key, &sealed.iv, &sealed.ciphertext)?;
        let text = String::from_utf8(plaintext.to_vec()).map_err(|_| {
            PostpilotError::Decryption("plaintext is not valid UTF-8".to_string())
        })?;
        Ok(SecretString::from(text))
    }
}

/// Mask a secret for display: first 4 and last 4 characters.
///
/// Values shorter than 10 characters are fully masked as `"****"`.
pub fn mask_secret(value: &str) -> String {
    let count = value.chars().count();
    if count < 10 {
        return "****".to_string();
    }
    let prefix: String = value.chars().take(4).collect();
    let suffix: String = value.chars().skip(count - 4).collect();
    format!("{prefix}...{suffix}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;
    use secrecy::ExposeSecret;

    use super::*;

    fn vault() -> CredentialVault {
        CredentialVault::new(EncryptionKey::generate().unwrap()).unwrap()
    }

    fn config_with_key(key: &str) -> VaultConfig {
        VaultConfig {
            encryption_key: Some(key.to_string()),
        }
    }

    #[test]
    fn roundtrip_known_value() {
        let vault = vault();
        let sealed = vault.encrypt("sk_live_abc123").unwrap();
        assert_eq!(vault.decrypt(&sealed).unwrap().expose_secret(), "sk_live_abc123");
        assert_eq!(sealed.iv.len(), crypto::IV_LEN);
    }

    #[test]
    fn identical_plaintexts_produce_distinct_pairs() {
        let vault = vault();
        let a = vault.encrypt("same-secret").unwrap();
        let b = vault.encrypt("same-secret").unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn ivs_are_unique_across_many_encryptions() {
        let vault = vault();
        let ivs: HashSet<Vec<u8>> = (0..500)
            .map(|_| vault.encrypt("repeat").unwrap().iv)
            .collect();
        assert_eq!(ivs.len(), 500);
    }

    #[test]
    fn flipped_ciphertext_byte_fails() {
        let vault = vault();
        let mut sealed = vault.encrypt("do-not-touch").unwrap();
        sealed.ciphertext[3] ^= 0x01;
        let err = vault.decrypt(&sealed).unwrap_err();
        assert!(err.is_crypto());
    }

    #[test]
    fn flipped_iv_byte_fails() {
        let vault = vault();
        let mut sealed = vault.encrypt("do-not-touch").unwrap();
        sealed.iv[0] ^= 0xff;
        assert!(matches!(
            vault.decrypt(&sealed),
            Err(PostpilotError::Decryption(_))
        ));
    }

    #[test]
    fn other_key_cannot_decrypt() {
        let sealed = vault().encrypt("sk_live_abc123").unwrap();
        let err = vault().decrypt(&sealed).unwrap_err();
        assert!(matches!(err, PostpilotError::Decryption(_)));
        assert!(!err.to_string().contains("sk_live"));
    }

    #[test]
    fn empty_plaintext_is_rejected() {
        assert!(matches!(
            vault().encrypt(""),
            Err(PostpilotError::Internal(_))
        ));
    }

    #[test]
    fn from_config_enforces_key_width() {
        let short = "a".repeat(31);
        let long = "a".repeat(33);
        let exact = "a".repeat(32);

        for bad in [&short, &long] {
            let err = CredentialVault::from_config(&config_with_key(bad)).unwrap_err();
            assert!(matches!(err, PostpilotError::Config(_)));
            assert!(!err.to_string().contains(bad.as_str()));
        }
        assert!(CredentialVault::from_config(&config_with_key(&exact)).is_ok());
    }

    #[test]
    fn from_config_requires_a_key() {
        let err = CredentialVault::from_config(&VaultConfig {
            encryption_key: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("ENCRYPTION_KEY is required"));
    }

    #[test]
    fn key_width_counts_bytes() {
        // 16 two-byte characters: 16 chars, 32 bytes.
        assert!(EncryptionKey::from_config_value(&"é".repeat(16)).is_ok());
        assert!(EncryptionKey::from_config_value(&"é".repeat(32)).is_err());
    }

    #[test]
    fn same_configured_key_decrypts_across_instances() {
        let key = "0123456789abcdef0123456789abcdef";
        let first = CredentialVault::from_config(&config_with_key(key)).unwrap();
        let second = CredentialVault::from_config(&config_with_key(key)).unwrap();
        let sealed = first.encrypt("persisted").unwrap();
        assert_eq!(second.decrypt(&sealed).unwrap().expose_secret(), "persisted");
    }

    #[test]
    fn debug_output_hides_key_material() {
        let key = EncryptionKey::from_config_value("0123456789abcdef0123456789abcdef").unwrap();
        assert!(!format!("{key:?}").contains("0123"));
        let vault = CredentialVault::new(key).unwrap();
        assert!(format!("{vault:?}").contains("REDACTED"));
    }

    #[test]
    fn mask_secret_long_and_short() {
        assert_eq!(mask_secret("sk_live_abc123"), "sk_l...c123");
        assert_eq!(mask_secret("short"), "****");
    }

    #[test]
    fn mask_secret_is_char_safe() {
        assert_eq!(mask_secret("ééééxxxxxxéééé"), "éééé...éééé");
    }

    proptest! {
        #[test]
        fn decrypt_inverts_encrypt(plaintext in ".{1,256}") {
            let vault = vault();
            let sealed = vault.encrypt(&plaintext).unwrap();
            let decrypted = vault.decrypt(&sealed).unwrap();
            prop_assert_eq!(decrypted.expose_secret(), plaintext.as_str());
        }
    }
}
