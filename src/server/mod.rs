pub mod extract;
pub mod handlers;
pub mod requests;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use hyper::Server;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::app::ports::{IdentityVerifier, TextGenerator};
use crate::storage::Storage;

/// Dependencies shared by every handler. `None` marks a service that is not
/// configured; handlers needing it answer 503.
#[derive(Clone)]
pub struct AppState {
    pub storage: Option<Arc<dyn Storage>>,
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub identity: Arc<dyn IdentityVerifier>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

/// Create the HTTP router with all API routes
pub fn create_server(state: AppState, cors_origins: &[String]) -> Router {
    use handlers::*;

    Router::new()
        .route("/api/health", get(health))
        .route("/api/emotions", get(emotions))
        .route("/api/chat/history", get(chat_history))
        .route("/api/chat/send", post(chat_send))
        .route("/api/chat/clear", delete(chat_clear))
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/:id", delete(delete_note))
        .route("/api/calendar/emotions", get(calendar_emotions))
        .route("/api/psychologists", get(list_psychologists).post(create_psychologist))
        .route("/api/psychologists/:id", delete(delete_psychologist))
        .route("/api/tips", get(tips))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins)),
        )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    state: AppState,
    cors_origins: &[String],
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(state, cors_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    info!("Health check: http://localhost:{port}/api/health");

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
