//! Server command implementation

use anyhow::Result;
use mutasi_core::AIClient;
use mutasi_server::{upload_limit_bytes, ServerConfig, DEFAULT_PORT};
use tracing::warn;

/// Resolve the listen port: flag, then `PORT`, then the default
pub fn resolve_port(flag: Option<u16>) -> u16 {
    flag.or_else(|| {
        std::env::var("PORT")
            .ok()
            .and_then(|p| p.trim().parse().ok())
    })
    .unwrap_or(DEFAULT_PORT)
}

/// Override the upload limit from `--max-upload-mb`
///
/// Zero or an out-of-range value keeps the current limit.
pub fn apply_upload_limit(config: &mut ServerConfig, max_upload_mb: Option<usize>) {
    let Some(mb) = max_upload_mb else {
        return;
    };
    match upload_limit_bytes(mb) {
        Some(bytes) => config.max_upload_bytes = bytes,
        None => warn!(max_upload_mb = mb, "Ignoring invalid --max-upload-mb"),
    }
}

pub async fn cmd_serve(host: &str, port: Option<u16>, max_upload_mb: Option<usize>) -> Result<()> {
    let port = resolve_port(port);

    let mut config = ServerConfig::from_env();
    apply_upload_limit(&mut config, max_upload_mb);

    println!("🚀 Starting Mutasi web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!("   Upload limit: {} MB", config.max_upload_mb());
    println!("   CORS origins: {}", config.allowed_origins.join(", "));

    let ai = AIClient::from_env();
    if ai.is_none() {
        println!();
        println!("   ⚠️  No AI backend configured - uploads will return 503");
        println!("      Set OPENAI_API_KEY (or AI_BACKEND=mock) to enable extraction");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    mutasi_server::serve_with_config(ai, host, port, config).await
}
