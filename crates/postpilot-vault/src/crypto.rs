// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] draws a fresh random 96-bit nonce from the system
//! CSPRNG. Nonce reuse under one key would be catastrophic for GCM.

use postpilot_core::PostpilotError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Width of the nonce stored as a record's `iv`.
pub const IV_LEN: usize = NONCE_LEN;

/// Width of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Width of an AES-256 key.
pub const KEY_LEN: usize = 32;

/// Characters used by [`generate_key_string`].
const KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Build the reusable AES-256-GCM key from raw key bytes.
pub fn make_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, PostpilotError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| PostpilotError::Config("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt plaintext with AES-256-GCM using a random 96-bit nonce.
///
/// Returns `(ciphertext_with_tag, nonce)`. Both must be stored to decrypt later.
pub fn seal(
    key: &LessSafeKey,
    rng: &SystemRandom,
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; IV_LEN]), PostpilotError> {
    let mut nonce_bytes = [0u8; IV_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| PostpilotError::Internal("failed to generate random nonce".to_string()))?;

    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    // The buffer is extended in place with the authentication tag.
    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| PostpilotError::Internal("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt ciphertext with AES-256-GCM.
///
/// `ciphertext` must include the tag appended by [`seal`]. Any mismatch of key,
/// nonce or bytes fails the tag check; no partial plaintext is returned.
pub fn open(
    key: &LessSafeKey,
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, PostpilotError> {
    let nonce = Nonce::try_assume_unique_for_key(iv).map_err(|_| {
        PostpilotError::Decryption(format!("iv must be {IV_LEN} bytes, got {}", iv.len()))
    })?;

    if ciphertext.len() < TAG_LEN {
        return Err(PostpilotError::Decryption(
            "ciphertext shorter than authentication tag".to_string(),
        ));
    }

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = key
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| {
            PostpilotError::Decryption(
                "authentication failed -- wrong key or corrupted data".to_string(),
            )
        })?
        .len();
    in_out.truncate(plaintext_len);

    Ok(in_out)
}

/// Generate a random 32-byte key.
pub fn generate_random_key() -> Result<[u8; KEY_LEN], PostpilotError> {
    let rng = SystemRandom::new();
    let mut key = [0u8; KEY_LEN];
    rng.fill(&mut key)
        .map_err(|_| PostpilotError::Internal("failed to generate random key".to_string()))?;
    Ok(key)
}

/// Generate a random alphanumeric key of exactly [`KEY_LEN`] characters,
/// suitable for the `ENCRYPTION_KEY` environment variable.
pub fn generate_key_string() -> Result<Zeroizing<String>, PostpilotError> {
    // Largest multiple of the alphabet size that fits in a byte; bytes at or
    // above it are rejected so every character is equally likely.
    let limit = (256 / KEY_ALPHABET.len() * KEY_ALPHABET.len()) as u8;

    let rng = SystemRandom::new();
    let mut out = Zeroizing::new(String::with_capacity(KEY_LEN));
    let mut buf = Zeroizing::new([0u8; 64]);
    while out.len() < KEY_LEN {
        rng.fill(&mut buf[..])
            .map_err(|_| PostpilotError::Internal("failed to generate random key".to_string()))?;
        for &b in buf.iter().filter(|&&b| b < limit) {
            if out.len() == KEY_LEN {
                break;
            }
            out.push(KEY_ALPHABET[b as usize % KEY_ALPHABET.len()] as char);
        }
    }
    Ok(out)
}
