//! Envelope cipher for stored credentials.
//!
//! Two wire formats share one `open` entry point:
//!
//! - **Sealed** (written by [`seal`], the only format new writes produce):
//!   `v2:<hex nonce (12 bytes)>:<hex ciphertext || tag>` — AES-256-GCM with
//!   a fresh 96-bit nonce from the OS CSPRNG per operation. Authenticated:
//!   tampering fails the open.
//! - **Legacy**: `<hex iv (16 bytes)>:<hex ciphertext>` — AES-256-CBC with
//!   PKCS#7 padding, exactly what the previous stack wrote. CBC without a
//!   MAC provides no integrity, so this codec is read-only: records decrypt
//!   during migration but are never written back in this shape.
//!
//! No shared mutable state beyond the caller's key — safe to call
//! concurrently from many requests.

use aes::Aes256;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};

use crate::crypto::EncryptionKey;
use crate::error::CryptoError;

/// Prefix marking the sealed (authenticated) envelope format.
pub const SEALED_PREFIX: &str = "v2:";

/// AES-256-GCM nonce length (96 bits).
const NONCE_LEN: usize = 12;

/// AES-256-CBC initialization vector length (one block).
const LEGACY_IV_LEN: usize = 16;

type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Encrypt a plaintext secret into a sealed envelope string.
///
/// Generates a fresh nonce per call; sealing the same plaintext twice never
/// yields the same envelope.
///
/// # Errors
///
/// Returns [`CryptoError::Encryption`] if the AEAD operation fails.
pub fn seal(key: &EncryptionKey, plaintext: &str) -> Result<String, CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| CryptoError::Encryption {
            reason: e.to_string(),
        })?;

    Ok(format!(
        "{SEALED_PREFIX}{}:{}",
        hex::encode(nonce),
        hex::encode(ciphertext)
    ))
}

/// Decrypt an envelope produced by [`seal`] or by the legacy CBC stack.
///
/// Dispatches on the `v2:` prefix; anything else is parsed as the legacy
/// `hex(iv):hex(ciphertext)` shape.
///
/// # Errors
///
/// Returns [`CryptoError::Malformed`] if the string is neither format, and
/// [`CryptoError::Decryption`] on wrong key, tampered data, or invalid
/// padding. Error text never contains key material or recovered plaintext.
pub fn open(key: &EncryptionKey, envelope: &str) -> Result<String, CryptoError> {
    match envelope.strip_prefix(SEALED_PREFIX) {
        Some(rest) => open_sealed(key, rest),
        None => open_legacy(key, envelope),
    }
}

fn open_sealed(key: &EncryptionKey, body: &str) -> Result<String, CryptoError> {
    let (nonce_hex, ct_hex) = body.split_once(':').ok_or_else(|| CryptoError::Malformed {
        reason: "sealed envelope missing ':' separator".to_owned(),
    })?;

    let nonce_bytes = hex::decode(nonce_hex).map_err(|_| CryptoError::Malformed {
        reason: "sealed envelope nonce is not valid hex".to_owned(),
    })?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(CryptoError::Malformed {
            reason: format!(
                "sealed envelope nonce must be {NONCE_LEN} bytes, got {}",
                nonce_bytes.len()
            ),
        });
    }

    let ciphertext = hex::decode(ct_hex).map_err(|_| CryptoError::Malformed {
        reason: "sealed envelope ciphertext is not valid hex".to_owned(),
    })?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let nonce = Nonce::from_slice(&nonce_bytes);
    let plaintext = cipher
        .decrypt(nonce, ciphertext.as_slice())
        .map_err(|_| CryptoError::Decryption {
            reason: "authentication failed (wrong key or tampered data)".to_owned(),
        })?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::Decryption {
        reason: "recovered data is not valid UTF-8".to_owned(),
    })
}

fn open_legacy(key: &EncryptionKey, envelope: &str) -> Result<String, CryptoError> {
    let (iv_hex, ct_hex) = envelope
        .split_once(':')
        .ok_or_else(|| CryptoError::Malformed {
            reason: "envelope missing ':' separator".to_owned(),
        })?;

    let iv_bytes = hex::decode(iv_hex).map_err(|_| CryptoError::Malformed {
        reason: "legacy envelope IV is not valid hex".to_owned(),
    })?;
    let iv: [u8; LEGACY_IV_LEN] =
        iv_bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::Malformed {
                reason: format!(
                    "legacy envelope IV must be {LEGACY_IV_LEN} bytes, got {}",
                    iv_bytes.len()
                ),
            })?;

    let ciphertext = hex::decode(ct_hex).map_err(|_| CryptoError::Malformed {
        reason: "legacy envelope ciphertext is not valid hex".to_owned(),
    })?;
    if ciphertext.is_empty() || ciphertext.len() % LEGACY_IV_LEN != 0 {
        return Err(CryptoError::Malformed {
            reason: "legacy envelope ciphertext is not a whole number of blocks".to_owned(),
        });
    }

    let plaintext = Aes256CbcDec::new(key.as_bytes().into(), (&iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CryptoError::Decryption {
            reason: "invalid padding (wrong key or corrupted data)".to_owned(),
        })?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::Decryption {
        reason: "recovered data is not valid UTF-8".to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use cbc::cipher::BlockEncryptMut;
    use rand::RngCore;

    use super::*;

    type Aes256CbcEnc = cbc::Encryptor<Aes256>;

    /// Produce a legacy-format envelope the way the previous stack did.
    fn seal_legacy(key: &EncryptionKey, plaintext: &str) -> String {
        let mut iv = [0u8; LEGACY_IV_LEN];
        rand::rngs::OsRng.fill_bytes(&mut iv);
        let ciphertext = Aes256CbcEnc::new(key.as_bytes().into(), (&iv).into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        format!("{}:{}", hex::encode(iv), hex::encode(ciphertext))
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = EncryptionKey::generate();
        for plaintext in ["S3cr3t!", "", "correct horse battery staple", "pässwörd 🔑"] {
            let envelope = seal(&key, plaintext).unwrap();
            assert!(envelope.starts_with(SEALED_PREFIX));
            assert_eq!(open(&key, &envelope).unwrap(), plaintext);
        }
    }

    #[test]
    fn sealing_twice_yields_distinct_nonces() {
        let key = EncryptionKey::generate();
        let mut nonces = HashSet::new();
        for _ in 0..1000 {
            let envelope = seal(&key, "same password").unwrap();
            let nonce_hex = envelope
                .strip_prefix(SEALED_PREFIX)
                .and_then(|rest| rest.split(':').next())
                .unwrap()
                .to_owned();
            nonces.insert(nonce_hex);
        }
        assert_eq!(nonces.len(), 1000);
    }

    #[test]
    fn open_with_wrong_key_fails() {
        let envelope = seal(&EncryptionKey::generate(), "secret").unwrap();
        let err = open(&EncryptionKey::generate(), &envelope).unwrap_err();
        assert!(matches!(err, CryptoError::Decryption { .. }));
    }

    #[test]
    fn tampered_sealed_envelope_fails() {
        let key = EncryptionKey::generate();
        let envelope = seal(&key, "secret").unwrap();
        // Flip the last ciphertext nibble.
        let mut tampered = envelope.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == '0' { '1' } else { '0' });
        let err = open(&key, &tampered).unwrap_err();
        assert!(matches!(err, CryptoError::Decryption { .. }));
    }

    #[test]
    fn legacy_envelope_opens() {
        let key = EncryptionKey::generate();
        let envelope = seal_legacy(&key, "S3cr3t!");
        assert!(!envelope.starts_with(SEALED_PREFIX));
        assert_eq!(open(&key, &envelope).unwrap(), "S3cr3t!");
    }

    #[test]
    fn legacy_envelope_exact_block_length() {
        // 16-byte plaintext forces a full padding block.
        let key = EncryptionKey::generate();
        let envelope = seal_legacy(&key, "0123456789abcdef");
        assert_eq!(open(&key, &envelope).unwrap(), "0123456789abcdef");
    }

    #[test]
    fn legacy_wrong_key_fails() {
        let envelope = seal_legacy(&EncryptionKey::generate(), "secret");
        let err = open(&EncryptionKey::generate(), &envelope).unwrap_err();
        // Unauthenticated CBC: wrong key shows up as bad padding or garbage.
        assert!(matches!(
            err,
            CryptoError::Decryption { .. } | CryptoError::Malformed { .. }
        ));
    }

    #[test]
    fn missing_separator_is_malformed() {
        let key = EncryptionKey::generate();
        let err = open(&key, "deadbeef").unwrap_err();
        assert!(matches!(err, CryptoError::Malformed { .. }));
    }

    #[test]
    fn non_hex_iv_is_malformed() {
        let key = EncryptionKey::generate();
        let err = open(&key, "not-hex-at-all:00112233").unwrap_err();
        assert!(matches!(err, CryptoError::Malformed { .. }));
    }

    #[test]
    fn short_iv_is_malformed() {
        let key = EncryptionKey::generate();
        // 8-byte IV instead of 16.
        let err = open(&key, "0011223344556677:00112233445566770011223344556677").unwrap_err();
        assert!(matches!(err, CryptoError::Malformed { .. }));
    }

    #[test]
    fn partial_block_ciphertext_is_malformed() {
        let key = EncryptionKey::generate();
        let iv_hex = hex::encode([0u8; LEGACY_IV_LEN]);
        let err = open(&key, &format!("{iv_hex}:00112233")).unwrap_err();
        assert!(matches!(err, CryptoError::Malformed { .. }));
    }

    #[test]
    fn sealed_with_bad_nonce_length_is_malformed() {
        let key = EncryptionKey::generate();
        let err = open(&key, "v2:00112233:00112233445566778899aabbccddeeff").unwrap_err();
        assert!(matches!(err, CryptoError::Malformed { .. }));
    }

    #[test]
    fn error_text_never_contains_plaintext() {
        let key = EncryptionKey::generate();
        let envelope = seal(&key, "hunter2-super-secret").unwrap();
        let err = open(&EncryptionKey::generate(), &envelope).unwrap_err();
        assert!(!err.to_string().contains("hunter2"));
    }
}
