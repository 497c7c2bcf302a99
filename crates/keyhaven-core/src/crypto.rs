//! Master key handling for `KeyHaven`.
//!
//! Provides the zeroize-on-drop key newtype and the key provider seam. The
//! vault runs on a single long-lived 256-bit master key from configuration;
//! the [`KeyProvider`] trait isolates that fact so rotation or external
//! key-management integration can be added without touching the cipher.

use std::fmt;

use aes_gcm::Aes256Gcm;
use aes_gcm::aead::{KeyInit, OsRng};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// A 256-bit encryption key that is zeroized on drop.
///
/// The inner bytes are never exposed in `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; 32]);

impl EncryptionKey {
    /// Create a key from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a key from a byte slice, enforcing the AES-256 length strictly.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] unless the slice is exactly
    /// 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                actual: bytes.len(),
            })?;
        Ok(Self(array))
    }

    /// Generate a new random key using the OS CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let key = Aes256Gcm::generate_key(OsRng);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&key);
        Self(bytes)
    }

    /// Borrow the raw key bytes.
    ///
    /// Use with care — the caller must not log or persist these bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Supplies the current master key for envelope operations.
pub trait KeyProvider: Send + Sync + 'static {
    /// The key to seal new envelopes with and to open existing ones.
    fn current_key(&self) -> &EncryptionKey;
}

/// A key provider holding one fixed key from configuration. No rotation.
pub struct StaticKeyProvider {
    key: EncryptionKey,
}

impl StaticKeyProvider {
    /// Wrap the configured master key.
    #[must_use]
    pub fn new(key: EncryptionKey) -> Self {
        Self { key }
    }
}

impl KeyProvider for StaticKeyProvider {
    fn current_key(&self) -> &EncryptionKey {
        &self.key
    }
}

impl fmt::Debug for StaticKeyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticKeyProvider").finish_non_exhaustive()
    }
}
