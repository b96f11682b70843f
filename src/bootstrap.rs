use std::sync::Arc;

use tracing::{info, warn};

use crate::app::ports::{IdentityVerifier, TextGenerator};
use crate::config::{Config, ServiceAccount};
use crate::constants::{GOOGLE_TOKEN_URL, METADATA_TOKEN_URL};
use crate::error::Result;
use crate::infra::firestore::FirestoreStorage;
use crate::infra::gemini::GeminiClient;
use crate::infra::google_auth::TokenSource;
use crate::infra::http_client::build_client;
use crate::infra::identity_toolkit::FirebaseIdentityVerifier;
use crate::infra::static_identity::StaticIdentityVerifier;
use crate::server::AppState;
use crate::storage::{InMemoryStorage, Storage};

/// Which services a configuration enables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReport {
    pub store: bool,
    pub identity: bool,
    pub generator: bool,
}

impl ServiceReport {
    pub fn from_config(config: &Config) -> Self {
        Self {
            store: matches!(config.service_account(), Ok(Some(_))),
            identity: config.firebase_api_key.is_some(),
            generator: config.gemini_api_key.is_some(),
        }
    }
}

/// Token source for Firestore: a configured token, else the service-account
/// key, else the metadata server.
fn token_source(config: &Config, account: &ServiceAccount) -> TokenSource {
    if let Some(token) = &config.firestore_access_token {
        return TokenSource::Static(token.clone());
    }
    match (&account.client_email, &account.private_key) {
        (Some(client_email), Some(private_key)) => TokenSource::ServiceAccount {
            client_email: client_email.clone(),
            private_key: private_key.clone(),
            token_uri: account
                .token_uri
                .clone()
                .unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
        },
        _ => TokenSource::Metadata { url: METADATA_TOKEN_URL.to_string() },
    }
}

fn build_storage(config: &Config, client: &reqwest::Client) -> Option<Arc<dyn Storage>> {
    match config.service_account() {
        Ok(Some(account)) => {
            let tokens = token_source(config, &account);
            let auth = match &tokens {
                TokenSource::Static(_) => "FIRESTORE_ACCESS_TOKEN",
                TokenSource::ServiceAccount { .. } => "service account key",
                TokenSource::Metadata { .. } => "metadata server",
            };
            info!(
                project = %account.project_id,
                account = account.client_email.as_deref().unwrap_or("-"),
                auth,
                "Firestore initialized"
            );
            Some(Arc::new(FirestoreStorage::new(client.clone(), account.project_id, tokens)))
        }
        Ok(None) => {
            warn!("FIREBASE_CREDENTIALS not set. Firebase features will be disabled.");
            None
        }
        Err(e) => {
            warn!("Could not initialize Firebase: {}. Firebase features will be disabled.", e);
            None
        }
    }
}

fn build_identity(config: &Config, client: &reqwest::Client, in_memory: bool) -> Arc<dyn IdentityVerifier> {
    if let Some(key) = &config.firebase_api_key {
        return Arc::new(FirebaseIdentityVerifier::new(client.clone(), key.clone()));
    }
    if in_memory && !config.dev_tokens.is_empty() {
        warn!(count = config.dev_tokens.len(), "Accepting ZENITH_DEV_TOKENS; development only");
        let verifier = config.dev_tokens.iter().fold(StaticIdentityVerifier::new(), |v, t| {
            v.with_user(t.token.clone(), t.uid.clone(), t.email.clone(), t.name.as_deref())
        });
        return Arc::new(verifier);
    }
    if !config.dev_tokens.is_empty() {
        warn!("ZENITH_DEV_TOKENS ignored: only honoured with --in-memory");
    }
    warn!("FIREBASE_API_KEY not set. Every bearer token will be rejected.");
    Arc::new(StaticIdentityVerifier::new())
}

/// Wire the application state from configuration. Missing services leave
/// their slot empty rather than failing startup.
pub fn build_state(config: &Config, in_memory: bool) -> Result<AppState> {
    let client = build_client(config.http_timeout)?;

    let storage = if in_memory {
        info!("Using in-memory storage; data is lost on exit");
        Some(Arc::new(InMemoryStorage::new()) as Arc<dyn Storage>)
    } else {
        build_storage(config, &client)
    };

    let identity = build_identity(config, &client, in_memory);

    let generator: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
        Some(key) => {
            let gemini = GeminiClient::new(client, key.clone(), config.gemini_model.clone());
            info!("Gemini AI initialized ({})", gemini.model());
            Some(Arc::new(gemini))
        }
        None => {
            warn!("GEMINI_API_KEY not set. Chat features will be disabled.");
            None
        }
    };

    if config.uses_default_secret() {
        warn!("SECRET_KEY is the development default");
    }

    Ok(AppState { storage, generator, identity })
}
