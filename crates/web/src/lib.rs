//! Tanakh Web Server
//!
//! Read-only HTTP API over the corpus and commentary, with tower middleware
//! for CORS, tracing, and compression.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use axum::{Router, http::HeaderValue, http::Method};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

mod error_handler;
pub mod routes;
mod state;

pub use error_handler::{ApiError, ApiResult, ErrorCategory, ErrorResponse};
pub use state::{AppState, DEFAULT_SEARCH_LIMIT};

/// Web server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to (e.g., "127.0.0.1:3000")
    pub bind_address: String,
    /// Allowed CORS origin, or `*` for any
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            cors_origin: "*".to_string(),
        }
    }
}

/// Create a new router with middleware.
///
/// # Errors
///
/// Returns an error if the CORS origin is not a valid header value.
pub fn create_router(state: AppState, config: &ServerConfig) -> Result<Router, Error> {
    info!("Creating router with CORS origin: {}", config.cors_origin);

    let origin = if config.cors_origin == "*" {
        AllowOrigin::any()
    } else {
        AllowOrigin::exact(config.cors_origin.parse::<HeaderValue>()?)
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    let router = routes::create_router().with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(cors),
    );

    Ok(router)
}

/// Bind and serve until the process is stopped.
///
/// # Errors
///
/// Returns an error if the router cannot be built or the address cannot be
/// bound.
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), Error> {
    let router = create_router(state, config)?;
    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Tanakh reader listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}

/// Web server errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid header value
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderValue),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<std::convert::Infallible> for Error {
    fn from(value: std::convert::Infallible) -> Self {
        match value {}
    }
}
