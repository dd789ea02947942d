//! Mutasi Web Server
//!
//! Axum-based REST API for uploading bank statements and fetching the
//! extracted transactions.
//!
//! - Restrictive CORS policy (configured origins only)
//! - Upload size limit enforced while reading the multipart body
//! - JSON error bodies with matching HTTP status codes

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use mutasi_core::{AIBackend, AIClient};

mod handlers;
pub mod store;

pub use store::{ExtractionRecord, ExtractionStatus, ExtractionStore, DEFAULT_RECORD_TTL};

/// Default maximum upload size in MB
pub const DEFAULT_MAX_UPLOAD_MB: usize = 5;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3002;

/// Origins allowed when `MUTASI_ALLOWED_ORIGINS` is not set
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:3001"];

/// Headroom on top of the file limit for multipart framing
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
    /// Largest accepted file, in bytes
    pub max_upload_bytes: usize,
    /// How long extraction records stay retrievable
    pub record_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            record_ttl: DEFAULT_RECORD_TTL,
        }
    }
}

impl ServerConfig {
    /// Build from environment variables
    ///
    /// - `MUTASI_ALLOWED_ORIGINS`: comma-separated origins
    /// - `MAX_FILE_SIZE_MB`: upload limit in MB
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(origins) = std::env::var("MUTASI_ALLOWED_ORIGINS") {
            let origins = parse_origins(&origins);
            if !origins.is_empty() {
                config.allowed_origins = origins;
            }
        }

        if let Ok(raw) = std::env::var("MAX_FILE_SIZE_MB") {
            match raw.trim().parse::<usize>().ok().and_then(upload_limit_bytes) {
                Some(bytes) => config.max_upload_bytes = bytes,
                None => warn!(value = %raw, "Ignoring invalid MAX_FILE_SIZE_MB"),
            }
        }

        config
    }

    /// Upload limit in whole MB (for messages)
    pub fn max_upload_mb(&self) -> usize {
        self.max_upload_bytes / 1024 / 1024
    }
}

/// Convert an upload limit in MB to bytes
///
/// Returns `None` for zero or for values that do not fit in `usize`.
pub fn upload_limit_bytes(mb: usize) -> Option<usize> {
    if mb == 0 {
        return None;
    }
    mb.checked_mul(1024 * 1024)
}

/// Parse a comma-separated list of origins, dropping blanks
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Shared application state
pub struct AppState {
    /// `None` when no backend is configured; uploads then answer 503
    pub ai: Option<AIClient>,
    pub store: ExtractionStore,
    pub config: ServerConfig,
}

/// Create the application router
pub fn create_router(ai: Option<AIClient>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        ai,
        store: ExtractionStore::new(config.record_ttl),
        config,
    });
    create_router_with_state(state)
}

/// Create the application router around existing state
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    let config = state.config.clone();

    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/upload", post(handlers::upload_statement))
        .route("/extraction/:id", get(handlers::get_extraction));

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(
            config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    ai: Option<AIClient>,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    check_ai_connection(ai.as_ref()).await;

    info!(
        origins = ?config.allowed_origins,
        max_upload_mb = config.max_upload_mb(),
        "Server configuration"
    );

    let app = create_router(ai, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: Option<&AIClient>) {
    match ai {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ AI backend connected: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  AI backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            warn!("⚠️  AI backend not configured (set OPENAI_API_KEY to enable uploads)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
        }
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}
