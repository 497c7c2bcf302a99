//! Error types for `keyhaven-core`.
//!
//! Each variant carries enough context to diagnose the problem without a
//! debugger. Crypto errors never include key material or recovered
//! plaintext — only operation descriptions.

/// Errors from envelope encryption and key handling.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// AES-256-GCM encryption failed.
    #[error("encryption failed: {reason}")]
    Encryption { reason: String },

    /// Decryption failed (wrong key, corrupted ciphertext, tampered tag, or
    /// invalid padding in the legacy format).
    #[error("decryption failed: {reason}")]
    Decryption { reason: String },

    /// The envelope string matches neither the sealed nor the legacy format.
    #[error("malformed envelope: {reason}")]
    Malformed { reason: String },

    /// The provided master key is not exactly 32 bytes.
    #[error("invalid key length: expected 32 bytes, got {actual}")]
    InvalidKeyLength { actual: usize },
}

/// Errors from session token issuance and verification.
///
/// The variants are distinguished for diagnostics; at the HTTP boundary all
/// of them collapse into a generic "unauthorized".
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token's expiry is in the past.
    #[error("session token expired")]
    Expired,

    /// The signature does not match the payload (tampering or wrong secret).
    #[error("session token signature invalid")]
    InvalidSignature,

    /// The token is not a structurally valid JWT.
    #[error("session token malformed: {reason}")]
    Malformed { reason: String },

    /// Signing a new token failed.
    #[error("token signing failed: {reason}")]
    Signing { reason: String },
}

/// Errors from the breach oracle client.
///
/// Callers must never treat any of these as "not breached" — a failed check
/// is a distinct outcome from a negative result.
#[derive(Debug, thiserror::Error)]
pub enum BreachError {
    /// The range query could not be sent or the connection failed.
    #[error("breach check request failed: {reason}")]
    Request { reason: String },

    /// The range endpoint answered with a non-success status.
    #[error("breach check endpoint returned status {status}")]
    Status { status: u16 },

    /// The bounded timeout elapsed before the endpoint answered.
    #[error("breach check timed out")]
    Timeout,

    /// The endpoint answered 2xx but the body did not follow the
    /// `SUFFIX:COUNT` line format.
    #[error("breach check response malformed: {reason}")]
    Parse { reason: String },
}

/// Errors from password generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Requested length is out of bounds.
    #[error("password length must be between {min} and {max}, got {requested}")]
    InvalidLength {
        requested: usize,
        min: usize,
        max: usize,
    },

    /// The alphabet has no characters to choose from.
    #[error("password alphabet is empty")]
    EmptyAlphabet,
}
