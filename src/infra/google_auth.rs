//! OAuth access tokens for Google REST APIs.
//!
//! Tokens from a service-account key or the metadata server are cached and
//! reused until shortly before they expire.

use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::constants::DATASTORE_SCOPE;
use crate::error::{ApiError, Result};
use crate::infra::http_client::error_body;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;
// Refresh this long before the provider-reported expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Where access tokens come from
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// A token supplied through configuration, used as-is
    Static(String),
    /// JWT-bearer grant signed with a service-account private key
    ServiceAccount {
        client_email: String,
        private_key: String,
        token_uri: String,
    },
    /// GCE/Cloud Run metadata server
    Metadata { url: String },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct TokenProvider {
    client: reqwest::Client,
    source: TokenSource,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(client: reqwest::Client, source: TokenSource) -> Self {
        Self {
            client,
            source,
            cached: Mutex::new(None),
        }
    }

    /// A valid access token, fetched only when the cached one is missing or stale
    pub async fn token(&self) -> Result<String> {
        if let TokenSource::Static(token) = &self.source {
            return Ok(token.clone());
        }

        // Held across the fetch so concurrent callers share one refresh
        let mut cached = self.cached.lock().await;
        if let Some(current) = cached.as_ref() {
            if current.expires_at > Instant::now() {
                return Ok(current.value.clone());
            }
        }

        let fresh = self.fetch().await?;
        let lifetime = Duration::from_secs(fresh.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS))
            .saturating_sub(EXPIRY_MARGIN);
        debug!(lifetime_secs = lifetime.as_secs(), "Fetched access token");

        *cached = Some(CachedToken {
            value: fresh.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(fresh.access_token)
    }

    async fn fetch(&self) -> Result<TokenResponse> {
        let resp = match &self.source {
            TokenSource::Static(token) => {
                return Ok(TokenResponse {
                    access_token: token.clone(),
                    expires_in: None,
                })
            }
            TokenSource::ServiceAccount {
                client_email,
                private_key,
                token_uri,
            } => {
                let assertion = sign_assertion(client_email, private_key, token_uri)?;
                self.client
                    .post(token_uri)
                    .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
                    .send()
                    .await?
            }
            TokenSource::Metadata { url } => {
                self.client
                    .get(url)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await?
            }
        };

        if !resp.status().is_success() {
            return Err(ApiError::Store(format!(
                "access token request failed: {}",
                error_body(resp).await
            )));
        }
        Ok(resp.json().await?)
    }
}

fn sign_assertion(client_email: &str, private_key: &str, token_uri: &str) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = AssertionClaims {
        iss: client_email,
        scope: DATASTORE_SCOPE,
        aud: token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };
    let key = EncodingKey::from_rsa_pem(private_key.as_bytes())
        .map_err(|e| ApiError::Config(format!("invalid service-account private key: {e}")))?;
    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| ApiError::Store(format!("could not sign token request: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const TEST_KEY: &str = include_str!("../../tests/fixtures/service_account_key.pem");

    fn service_account(server: &MockServer) -> TokenSource {
        TokenSource::ServiceAccount {
            client_email: "zenith@zenith-test.iam.gserviceaccount.com".into(),
            private_key: TEST_KEY.into(),
            token_uri: server.url("/token"),
        }
    }

    #[tokio::test]
    async fn service_account_grant_is_cached() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/token")
                .body_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer")
                .body_contains("assertion=");
            then.status(200)
                .json_body(json!({ "access_token": "sa-token", "expires_in": 3599, "token_type": "Bearer" }));
        });

        let provider = TokenProvider::new(reqwest::Client::new(), service_account(&server));
        assert_eq!(provider.token().await.unwrap(), "sa-token");
        assert_eq!(provider.token().await.unwrap(), "sa-token");

        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn nearly_expired_tokens_are_refreshed() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/token").header("Metadata-Flavor", "Google");
            then.status(200).json_body(json!({ "access_token": "short", "expires_in": 30 }));
        });

        let provider = TokenProvider::new(
            reqwest::Client::new(),
            TokenSource::Metadata { url: server.url("/token") },
        );
        provider.token().await.unwrap();
        provider.token().await.unwrap();

        mock.assert_hits(2);
    }

    #[tokio::test]
    async fn static_token_needs_no_request() {
        let provider = TokenProvider::new(reqwest::Client::new(), TokenSource::Static("fixed".into()));
        assert_eq!(provider.token().await.unwrap(), "fixed");
    }

    #[tokio::test]
    async fn rejected_grant_is_a_store_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(400).json_body(json!({ "error": "invalid_grant" }));
        });

        let provider = TokenProvider::new(reqwest::Client::new(), service_account(&server));
        match provider.token().await {
            Err(ApiError::Store(msg)) => assert!(msg.contains("invalid_grant")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn malformed_key_is_a_config_error() {
        let err = sign_assertion("a@b.c", "not a key", "https://oauth2.googleapis.com/token").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
