use std::sync::Arc;

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header::AUTHORIZATION, HeaderMap, Request};
use axum::Json;
use tracing::debug;

use crate::app::ports::TextGenerator;
use crate::error::ApiError;
use crate::metrics::{record, MetricName};
use crate::server::AppState;
use crate::storage::Storage;
use crate::types::Claims;

/// The document store, or 503 when it failed to initialize.
/// Put it first in a handler's arguments so the check precedes authentication.
pub struct Store(pub Arc<dyn Storage>);

#[async_trait]
impl FromRequestParts<AppState> for Store {
    type Rejection = ApiError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match &state.storage {
            Some(storage) => Ok(Store(storage.clone())),
            None => {
                record(MetricName::RequestsStoreUnavailable);
                Err(ApiError::StoreUnavailable)
            }
        }
    }
}

/// The text generator, or 503 when no API key was configured
pub struct Generator(pub Arc<dyn TextGenerator>);

#[async_trait]
impl FromRequestParts<AppState> for Generator {
    type Rejection = ApiError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state
            .generator
            .clone()
            .map(Generator)
            .ok_or(ApiError::GeneratorUnavailable)
    }
}

/// Claims of a caller whose bearer token the identity provider accepted
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// The e-mail claim, which owns the caller's notes
    pub fn email(&self) -> Result<&str, ApiError> {
        self.0
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Authenticated account has no email address".to_string()))
    }
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            record(MetricName::RequestsUnauthorized);
            return Err(ApiError::Unauthorized);
        };
        match state.identity.verify(token).await {
            Ok(claims) => Ok(AuthUser(claims)),
            Err(e) => {
                debug!(error = %e, "Token verification failed");
                record(MetricName::RequestsUnauthorized);
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// `Json` whose rejections become 400 responses with the usual error body
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, B, T> FromRequest<S, B> for JsonBody<T>
where
    Json<T>: FromRequest<S, B, Rejection = JsonRejection>,
    S: Send + Sync,
    B: Send + 'static,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}
