//! HTTP API server for the notes service.
//!
//! This crate provides the REST transport over a [`NoteStore`].
//!
//! # Features
//!
//! - CRUD endpoints under `/api/notes`
//! - Payload validation with per-field messages
//! - Uniform JSON error bodies
//! - CORS
//! - Request logging
//! - OpenAPI document and Swagger UI at `/docs`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use notes_server::{Server, ServerConfig};
//! use notes_store::NoteStore;
//!
//! let store = Arc::new(NoteStore::open("data/notes.json"));
//! let config = ServerConfig::new().with_bind_address("127.0.0.1:3000".parse()?);
//!
//! Server::new(store, config).run().await?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;
pub mod validation;

pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError};
pub use logging::request_logging_middleware;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
};
use notes_store::NoteStore;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// The notes HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server over `store` with the given configuration.
    pub fn new(store: Arc<NoteStore>, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(store, config),
        }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(routes::health_routes())
            .nest("/api/notes", routes::notes_routes())
            .merge(routes::swagger_ui())
            .fallback(not_found)
            // A known path with the wrong method is still "not found".
            .method_not_allowed_fallback(not_found)
            .layer(DefaultBodyLimit::max(self.state.config.max_body_size))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                logging::request_logging_middleware,
            ))
            .layer(cors_layer(&self.state.config.cors_origins))
            // TraceLayer for detailed HTTP tracing
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        self.run_until(addr, std::future::pending()).await
    }

    /// Run on the configured address until `shutdown` resolves, then drain
    /// in-flight requests.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_until(addr, shutdown).await
    }

    async fn run_until(
        self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let router = self.router();

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(format!("Failed to read local address: {}", e)))?;

        info!("Starting server on {}", local_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        info!("Server stopped");
        Ok(())
    }
}

async fn not_found() -> ServerError {
    ServerError::NotFound("Resource not found".to_string())
}

/// Build the CORS layer. No configured origins means any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let mut parsed = Vec::new();
    for origin in origins {
        match HeaderValue::from_str(origin) {
            Ok(value) => parsed.push(value),
            Err(err) => warn!("ignoring invalid CORS origin '{origin}': {err}"),
        }
    }
    layer.allow_origin(parsed)
}
