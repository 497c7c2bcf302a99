//! k-anonymity breach oracle client.
//!
//! Checks whether a password appears in a public breach corpus (the
//! HaveIBeenPwned range API) without ever revealing the password — or even
//! its full hash — to the remote service. Only the first 5 hex characters of
//! the SHA-1 digest leave the process; the returned candidate suffixes are
//! matched locally.
//!
//! A failed check is never "not breached": any transport or status failure
//! surfaces as [`BreachError`].

use std::time::Duration;

use sha1::{Digest, Sha1};
use tracing::debug;

use crate::error::BreachError;

/// Hex length of the digest prefix sent to the range endpoint.
const PREFIX_LEN: usize = 5;

/// Default bound on the external call, distinct from store operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Public range endpoint of the HaveIBeenPwned password corpus.
pub const DEFAULT_BASE_URL: &str = "https://api.pwnedpasswords.com/range";

/// Outcome of a breach check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BreachReport {
    /// Whether the password's hash suffix matched a corpus entry.
    pub breached: bool,
    /// Number of corpus occurrences (0 when not breached).
    pub count: u64,
}

/// HTTP client for the range endpoint, with a bounded timeout.
#[derive(Debug, Clone)]
pub struct BreachClient {
    http: reqwest::Client,
    base_url: String,
}

impl BreachClient {
    /// Build a client against a range endpoint base URL.
    ///
    /// # Errors
    ///
    /// Returns [`BreachError::Request`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BreachError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BreachError::Request {
                reason: e.to_string(),
            })?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    /// Check a password against the breach corpus.
    ///
    /// Sends `GET {base_url}/{prefix}` where `prefix` is the first 5 hex
    /// characters of the uppercased SHA-1 digest, then matches the returned
    /// `SUFFIX:COUNT` lines against the local 35-character suffix.
    ///
    /// # Errors
    ///
    /// Returns [`BreachError::Timeout`] when the bounded timeout elapses,
    /// [`BreachError::Status`] on a non-2xx answer, and
    /// [`BreachError::Request`] on any other transport failure.
    pub async fn check(&self, password: &str) -> Result<BreachReport, BreachError> {
        let digest = hex::encode_upper(Sha1::digest(password.as_bytes()));
        let (prefix, suffix) = digest.split_at(PREFIX_LEN);

        let url = format!("{}/{prefix}", self.base_url);
        let response = self.http.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                BreachError::Timeout
            } else {
                BreachError::Request {
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BreachError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                BreachError::Timeout
            } else {
                BreachError::Request {
                    reason: e.to_string(),
                }
            }
        })?;

        for line in body.lines() {
            let Some((candidate, count)) = line.trim().split_once(':') else {
                continue;
            };
            if candidate.eq_ignore_ascii_case(suffix) {
                let count = count.trim().parse().map_err(|_| BreachError::Parse {
                    reason: "occurrence count is not a number".to_owned(),
                })?;
                debug!(count, "password found in breach corpus");
                return Ok(BreachReport {
                    breached: true,
                    count,
                });
            }
        }

        Ok(BreachReport {
            breached: false,
            count: 0,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::get;

    use super::*;

    /// SHA-1("password"), a fixture every breach corpus contains.
    const PASSWORD_SHA1: &str = "5BAA61E4C9B93F3F0682250B6CF8331B7EE68FD8";

    #[derive(Clone)]
    struct MockState {
        requested: Arc<Mutex<Vec<String>>>,
        status: StatusCode,
        body: String,
    }

    async fn range_handler(
        State(state): State<MockState>,
        Path(prefix): Path<String>,
    ) -> (StatusCode, String) {
        state.requested.lock().unwrap().push(prefix);
        (state.status, state.body.clone())
    }

    /// Spawn a local range endpoint and return its base URL plus the log of
    /// requested prefixes.
    async fn spawn_mock(status: StatusCode, body: &str) -> (String, Arc<Mutex<Vec<String>>>) {
        let requested = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            requested: Arc::clone(&requested),
            status,
            body: body.to_owned(),
        };
        let app = Router::new()
            .route("/range/{prefix}", get(range_handler))
            .with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/range"), requested)
    }

    #[tokio::test]
    async fn digest_split_matches_known_vector() {
        let digest = hex::encode_upper(Sha1::digest(b"password"));
        assert_eq!(digest, PASSWORD_SHA1);
        let (prefix, suffix) = digest.split_at(PREFIX_LEN);
        assert_eq!(prefix, "5BAA6");
        assert_eq!(suffix.len(), 35);
    }

    #[tokio::test]
    async fn sends_only_the_five_char_prefix() {
        let body = format!("{}:42\n", &PASSWORD_SHA1[PREFIX_LEN..]);
        let (base_url, requested) = spawn_mock(StatusCode::OK, &body).await;
        let client = BreachClient::new(base_url, DEFAULT_TIMEOUT).unwrap();

        client.check("password").await.unwrap();

        let log = requested.lock().unwrap();
        assert_eq!(log.as_slice(), ["5BAA6"]);
    }

    #[tokio::test]
    async fn matching_suffix_reports_breached() {
        let body = format!(
            "0018A45C4D1DEF81644B54AB7F969B88D65:3\n{}:1087128\nFFFFAAAA00001111222233334444555566:2\n",
            &PASSWORD_SHA1[PREFIX_LEN..]
        );
        let (base_url, _) = spawn_mock(StatusCode::OK, &body).await;
        let client = BreachClient::new(base_url, DEFAULT_TIMEOUT).unwrap();

        let report = client.check("password").await.unwrap();
        assert!(report.breached);
        assert_eq!(report.count, 1_087_128);
    }

    #[tokio::test]
    async fn no_matching_suffix_reports_clean() {
        let body = "0018A45C4D1DEF81644B54AB7F969B88D65:3\n";
        let (base_url, _) = spawn_mock(StatusCode::OK, body).await;
        let client = BreachClient::new(base_url, DEFAULT_TIMEOUT).unwrap();

        let report = client.check("password").await.unwrap();
        assert!(!report.breached);
        assert_eq!(report.count, 0);
    }

    #[tokio::test]
    async fn garbage_count_is_a_parse_error() {
        let body = format!("{}:not-a-number\n", &PASSWORD_SHA1[PREFIX_LEN..]);
        let (base_url, _) = spawn_mock(StatusCode::OK, &body).await;
        let client = BreachClient::new(base_url, DEFAULT_TIMEOUT).unwrap();

        let err = client.check("password").await.unwrap_err();
        assert!(matches!(err, BreachError::Parse { .. }));
    }

    #[tokio::test]
    async fn upstream_failure_is_an_error_not_a_negative() {
        let (base_url, _) = spawn_mock(StatusCode::SERVICE_UNAVAILABLE, "").await;
        let client = BreachClient::new(base_url, DEFAULT_TIMEOUT).unwrap();

        let err = client.check("password").await.unwrap_err();
        assert!(matches!(err, BreachError::Status { status: 503 }));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        // Nothing listens on this port.
        let client =
            BreachClient::new("http://127.0.0.1:1/range", DEFAULT_TIMEOUT).unwrap();
        let err = client.check("password").await.unwrap_err();
        assert!(matches!(err, BreachError::Request { .. }));
    }
}
