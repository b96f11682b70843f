use std::collections::HashMap;

use async_trait::async_trait;

use crate::app::ports::IdentityVerifier;
use crate::error::{ApiError, Result};
use crate::types::Claims;

/// Fixed token → claims table for local development and tests
#[derive(Default)]
pub struct StaticIdentityVerifier {
    tokens: HashMap<String, Claims>,
}

impl StaticIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(
        mut self,
        token: impl Into<String>,
        uid: impl Into<String>,
        email: impl Into<String>,
        name: Option<&str>,
    ) -> Self {
        self.tokens.insert(
            token.into(),
            Claims {
                uid: uid.into(),
                email: Some(email.into()),
                name: name.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<Claims> {
        self.tokens.get(token).cloned().ok_or(ApiError::Unauthorized)
    }
}
