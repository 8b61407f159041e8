// Codepilot HTTP server
//
// Loads `.env`, installs the logger, builds the AI service once and serves
// the router until Ctrl-C.

use std::net::SocketAddr;

use codepilot_lib::{AIConfig, AIService};
use codepilot_server::{build_router, ServerConfig};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file; project root first, then current dir
    let _ = dotenvy::from_filename("../.env").or_else(|_| dotenvy::dotenv());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let ai_config = match AIConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("[server] invalid AI configuration: {}", e);
            std::process::exit(1);
        }
    };
    let server_config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("[server] invalid server configuration: {}", e);
            std::process::exit(1);
        }
    };

    let service = AIService::from_config(ai_config);
    if !service.is_configured() {
        log::warn!("[server] GROQ_API_KEY not set; AI endpoints will answer 503");
    }

    let router = build_router(service, &server_config);
    let addr = server_config.addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            log::error!("[server] Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    log::info!(
        "[server] listening on http://{} ({} requests per {:?} per client on /ai)",
        addr,
        server_config.rate_limit_max,
        server_config.rate_limit_window
    );

    // Peer addresses key the per-client rate limit
    let result = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("[server] shutdown requested");
        })
        .await;

    if let Err(e) = result {
        log::error!("[server] server error: {}", e);
        std::process::exit(1);
    }
    log::info!("[server] stopped");
}
