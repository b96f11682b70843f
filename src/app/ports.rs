use crate::error::Result;
use crate::types::Claims;
use async_trait::async_trait;

/// Verifies a bearer token with the identity provider.
///
/// Any failure (expired, malformed, provider unreachable) is an `Err`;
/// callers treat every error as "not authenticated".
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Claims>;
}

/// Generates a text completion for a prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
