use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::app::ports::IdentityVerifier;
use crate::constants::IDENTITY_TOOLKIT_URL;
use crate::error::{ApiError, Result};
use crate::infra::http_client::error_body;
use crate::types::Claims;

/// Verifies Firebase ID tokens through the Identity Toolkit `accounts:lookup`
/// endpoint, which rejects expired, revoked or forged tokens.
pub struct FirebaseIdentityVerifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
}

impl FirebaseIdentityVerifier {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, IDENTITY_TOOLKIT_URL)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<Claims> {
        if token.is_empty() {
            return Err(ApiError::Unauthorized);
        }

        let endpoint = format!("{}/v1/accounts:lookup", self.base_url);
        let resp = self
            .client
            .post(&endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "idToken": token }))
            .send()
            .await?;

        if !resp.status().is_success() {
            debug!("Token rejected by identity provider: {}", error_body(resp).await);
            return Err(ApiError::Unauthorized);
        }

        let lookup: LookupResponse = resp.json().await?;
        let user = lookup.users.into_iter().next().ok_or(ApiError::Unauthorized)?;
        Ok(Claims {
            uid: user.local_id,
            email: user.email,
            name: user.display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn verifier(server: &MockServer) -> FirebaseIdentityVerifier {
        FirebaseIdentityVerifier::with_base_url(reqwest::Client::new(), "web-key", server.base_url())
    }

    #[tokio::test]
    async fn valid_token_yields_claims() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/accounts:lookup")
                .query_param("key", "web-key")
                .json_body(json!({ "idToken": "good" }));
            then.status(200).json_body(json!({
                "users": [{ "localId": "uid-1", "email": "ana@example.com", "displayName": "Ana" }]
            }));
        });

        let claims = verifier(&server).verify("good").await.unwrap();

        mock.assert();
        assert_eq!(claims.uid, "uid-1");
        assert_eq!(claims.email.as_deref(), Some("ana@example.com"));
        assert_eq!(claims.name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn rejected_token_is_unauthorized() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/accounts:lookup");
            then.status(400).json_body(json!({ "error": { "message": "INVALID_ID_TOKEN" } }));
        });

        let err = verifier(&server).verify("forged").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn empty_token_never_hits_the_network() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(200);
        });

        assert!(verifier(&server).verify("").await.is_err());
        mock.assert_hits(0);
    }
}
