//! Signed session tokens.
//!
//! Sessions are stateless HS256 JWTs binding `{user id, email, role}` to a
//! 1-hour absolute expiry. Nothing is persisted server-side: validity is
//! recomputed from the signature and expiry on every request, logout is
//! client-side token discard, and there is no refresh or revocation list.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::AuthError;

/// Absolute session lifetime from issuance.
pub const SESSION_TTL_SECS: i64 = 3600;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Owning user id.
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    /// Expiry (unix seconds). `now >= exp` means expired.
    pub exp: i64,
    /// Issued-at (unix seconds).
    pub iat: i64,
}

/// Issues and verifies session tokens with a single HMAC secret.
pub struct SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionSigner {
    /// Build a signer from the configured token secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token expiring [`SESSION_TTL_SECS`] from now.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if encoding fails.
    pub fn issue(&self, user_id: Uuid, email: &str, role: &str) -> Result<String, AuthError> {
        self.issue_with_ttl(user_id, email, role, SESSION_TTL_SECS)
    }

    /// Issue a token with an explicit lifetime. A zero or negative TTL
    /// produces an already-expired token, which tests use to exercise the
    /// expiry path.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if encoding fails.
    pub fn issue_with_ttl(
        &self,
        user_id: Uuid,
        email: &str,
        role: &str,
        ttl_secs: i64,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user_id,
            email: email.to_owned(),
            role: role.to_owned(),
            exp: now.saturating_add(ttl_secs),
            iat: now,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(
            |e| AuthError::Signing {
                reason: e.to_string(),
            },
        )
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// The failure shapes (expired / bad signature / malformed) are
    /// distinguished here for diagnostics; the HTTP boundary collapses them
    /// all into one generic "unauthorized".
    ///
    /// # Errors
    ///
    /// Returns the matching [`AuthError`] variant.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Exact expiry boundary — no leeway.
        validation.leeway = 0;

        match jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                let err = match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AuthError::InvalidSignature
                    }
                    _ => AuthError::Malformed {
                        reason: e.to_string(),
                    },
                };
                debug!(error = %err, "session token rejected");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signer() -> SessionSigner {
        SessionSigner::new("unit-test-secret")
    }

    #[test]
    fn issue_verify_roundtrip() {
        let signer = signer();
        let user_id = Uuid::new_v4();
        let token = signer.issue(user_id, "alice@example.com", "user").unwrap();
        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, "user");
        assert_eq!(claims.exp, claims.iat + SESSION_TTL_SECS);
    }

    #[test]
    fn expired_token_rejected() {
        let signer = signer();
        let token = signer
            .issue_with_ttl(Uuid::new_v4(), "a@example.com", "user", -60)
            .unwrap();
        let err = signer.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = signer()
            .issue(Uuid::new_v4(), "a@example.com", "user")
            .unwrap();
        let other = SessionSigner::new("a-different-secret");
        let err = other.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[test]
    fn tampered_payload_rejected() {
        let signer = signer();
        let token = signer
            .issue(Uuid::new_v4(), "a@example.com", "user")
            .unwrap();
        // Swap the payload segment for one from a different token.
        let other = signer
            .issue(Uuid::new_v4(), "mallory@example.com", "admin")
            .unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let other_payload = other.split('.').nth(1).unwrap();
        parts[1] = other_payload;
        let forged = parts.join(".");
        let err = signer.verify(&forged).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let err = signer().verify("not.a.jwt").unwrap_err();
        assert!(matches!(err, AuthError::Malformed { .. }));
    }
}
