//! WattTime API client for the grid carbon estimator.
//!
//! Implements the authenticated data source behind the aggregation engine:
//! session login, historical grid intensity queries, and the ascending sort
//! the engine relies on. The client performs no retries; every failure is
//! surfaced to the caller as-is.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use thiserror::Error;

use gc_core::{Coordinates, FetchError, Sample, SampleSource, SpanningWindow};

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_BASE_URL: &str = "https://api.watttime.org";

/// WattTime client errors.
#[derive(Debug, Error)]
pub enum WattTimeError {
    /// Neither a token nor a username/password pair was supplied.
    #[error("missing credentials: {reason}")]
    MissingCredentials { reason: &'static str },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// Transport-level request failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The API rejected the supplied credentials or session token.
    #[error("authentication rejected: {message}")]
    Unauthorized { message: String },
    /// Any other non-success response.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<WattTimeError> for FetchError {
    fn from(err: WattTimeError) -> Self {
        match err {
            WattTimeError::Unauthorized { .. } | WattTimeError::MissingCredentials { .. } => {
                Self::Authentication {
                    message: err.to_string(),
                }
            }
            _ => Self::Upstream {
                message: err.to_string(),
            },
        }
    }
}

/// Connection settings for [`Client::authenticate`].
#[derive(Clone, Default)]
pub struct ClientConfig {
    /// WattTime account name.
    pub username: Option<String>,
    /// WattTime account password.
    pub password: Option<String>,
    /// Pre-existing session token; skips the login round trip.
    pub token: Option<String>,
    /// Override for the API origin, mainly for tests.
    pub base_url: Option<String>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Authenticated WattTime API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across concurrent batches. Each
/// clone shares the underlying HTTP connection pool, and the session token
/// is immutable once established.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Establishes an authenticated session.
    ///
    /// A pre-existing token in `config` is used as-is; otherwise a login
    /// round trip exchanges the username/password pair for a session token.
    pub async fn authenticate(config: &ClientConfig) -> Result<Self, WattTimeError> {
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(WattTimeError::ClientBuild)?;

        if let Some(token) = config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
        {
            return Ok(Self {
                http,
                base_url,
                token: token.to_string(),
            });
        }

        let (Some(username), Some(password)) =
            (config.username.as_deref(), config.password.as_deref())
        else {
            return Err(WattTimeError::MissingCredentials {
                reason: "set a token or a username/password pair",
            });
        };
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(WattTimeError::MissingCredentials {
                reason: "username and password cannot be empty",
            });
        }

        let response = http
            .get(format!("{base_url}/login"))
            .basic_auth(username, Some(password))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(WattTimeError::Unauthorized {
                message: format!("login rejected for user {username}"),
            });
        }
        if !status.is_success() {
            return Err(WattTimeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        #[derive(Deserialize)]
        struct LoginResponse {
            token: String,
        }

        let payload: LoginResponse = serde_json::from_str(&body)
            .map_err(|err| WattTimeError::InvalidResponse(err.to_string()))?;

        Ok(Self {
            http,
            base_url,
            token: payload.token,
        })
    }

    /// Fetches grid intensity samples for a time range, sorted ascending by
    /// `point_time`.
    pub async fn fetch_data(
        &self,
        location: Coordinates,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>, WattTimeError> {
        let response = self
            .http
            .get(format!("{}/v2/data", self.base_url))
            .bearer_auth(&self.token)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("starttime", start.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("endtime", end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(WattTimeError::Unauthorized {
                message: "session token rejected".to_string(),
            });
        }
        if !status.is_success() {
            return Err(WattTimeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        decode_samples(&body)
    }
}

impl SampleSource for Client {
    fn fetch_samples(
        &self,
        location: Coordinates,
        window: &SpanningWindow,
    ) -> impl Future<Output = Result<Vec<Sample>, FetchError>> + Send {
        let (start, end) = (window.start, window.end);
        async move {
            self.fetch_data(location, start, end)
                .await
                .map_err(FetchError::from)
        }
    }
}

/// Decodes a data response and sorts it ascending by `point_time`.
///
/// The sort is stable, so readings sharing a timestamp keep their response
/// order. Unknown payload fields are ignored.
fn decode_samples(body: &str) -> Result<Vec<Sample>, WattTimeError> {
    #[derive(Deserialize)]
    struct DataPoint {
        point_time: DateTime<Utc>,
        value: f64,
    }

    let points: Vec<DataPoint> =
        serde_json::from_str(body).map_err(|err| WattTimeError::InvalidResponse(err.to_string()))?;
    let mut samples: Vec<Sample> = points
        .into_iter()
        .map(|point| Sample {
            point_time: point.point_time,
            value: point.value,
        })
        .collect();
    samples.sort_by_key(|sample| sample.point_time);
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> ClientConfig {
        ClientConfig {
            username: None,
            password: None,
            token: token.map(String::from),
            base_url: None,
        }
    }

    #[tokio::test]
    async fn authenticate_rejects_absent_credentials() {
        let err = Client::authenticate(&config(None)).await.unwrap_err();
        assert!(matches!(err, WattTimeError::MissingCredentials { .. }));
    }

    #[tokio::test]
    async fn authenticate_rejects_blank_credentials() {
        let cfg = ClientConfig {
            username: Some("  ".to_string()),
            password: Some("secret".to_string()),
            ..ClientConfig::default()
        };
        let err = Client::authenticate(&cfg).await.unwrap_err();
        assert!(matches!(err, WattTimeError::MissingCredentials { .. }));
    }

    #[tokio::test]
    async fn authenticate_uses_preexisting_token_without_login() {
        let client = Client::authenticate(&config(Some("session-token")))
            .await
            .unwrap();
        assert_eq!(client.token, "session-token");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn authenticate_trims_base_url_slash() {
        let cfg = ClientConfig {
            token: Some("t".to_string()),
            base_url: Some("https://example.test/".to_string()),
            ..ClientConfig::default()
        };
        let client = Client::authenticate(&cfg).await.unwrap();
        assert_eq!(client.base_url, "https://example.test");
    }

    #[tokio::test]
    async fn client_debug_redacts_token() {
        let client = Client::authenticate(&config(Some("secret-token")))
            .await
            .unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn config_debug_redacts_secrets() {
        let cfg = ClientConfig {
            username: Some("user".to_string()),
            password: Some("hunter2".to_string()),
            token: Some("session".to_string()),
            base_url: None,
        };
        let debug = format!("{cfg:?}");
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("session"));
    }

    #[test]
    fn decode_samples_sorts_ascending() {
        let body = r#"[
            {"point_time":"2024-03-04T11:00:00Z","value":800.0},
            {"point_time":"2024-03-04T10:00:00Z","value":400.0},
            {"point_time":"2024-03-04T10:30:00Z","value":600.0}
        ]"#;
        let samples = decode_samples(body).unwrap();
        let times: Vec<_> = samples.iter().map(|s| s.point_time).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted);
        assert!((samples[0].value - 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn decode_samples_keeps_duplicate_timestamps() {
        let body = r#"[
            {"point_time":"2024-03-04T10:00:00Z","value":400.0},
            {"point_time":"2024-03-04T10:00:00Z","value":600.0}
        ]"#;
        let samples = decode_samples(body).unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn decode_samples_ignores_unknown_fields() {
        let body = r#"[
            {"point_time":"2024-03-04T10:00:00Z","value":400.0,
             "frequency":300,"market":"RTM","ba":"CAISO_NORTH","datatype":"MOER","version":"3.2"}
        ]"#;
        let samples = decode_samples(body).unwrap();
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn decode_samples_accepts_empty_array() {
        assert!(decode_samples("[]").unwrap().is_empty());
    }

    #[test]
    fn decode_samples_rejects_non_array_payload() {
        let err = decode_samples("{}").unwrap_err();
        assert!(matches!(err, WattTimeError::InvalidResponse(_)));
    }

    #[test]
    fn unauthorized_maps_to_authentication_error() {
        let err = WattTimeError::Unauthorized {
            message: "nope".to_string(),
        };
        assert!(matches!(
            FetchError::from(err),
            FetchError::Authentication { .. }
        ));
    }

    #[test]
    fn api_and_decode_errors_map_to_upstream() {
        let api = WattTimeError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(matches!(FetchError::from(api), FetchError::Upstream { .. }));

        let decode = WattTimeError::InvalidResponse("bad json".to_string());
        assert!(matches!(
            FetchError::from(decode),
            FetchError::Upstream { .. }
        ));
    }
}
