//! API Server
//!
//! HTTP server setup: tracing, middleware stack and graceful shutdown.

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, handle_timeout, request_id_middleware, request_span},
    routes::create_router,
};
use crate::config::MinesConfig;
use crate::games::service::GameService;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use axum::error_handling::HandleErrorLayer;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Mines game HTTP server
pub struct ApiServer {
    config: MinesConfig,
    service: Arc<GameService>,
}

impl ApiServer {
    pub fn new(config: MinesConfig, service: Arc<GameService>) -> Self {
        Self { config, service }
    }

    /// Install the global tracing subscriber. RUST_LOG wins over the configured filter.
    pub fn init_tracing(config: &MinesConfig) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.monitoring.log_filter.as_str().into());

        // a subscriber may already be installed by an embedding binary
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }

    /// Start the API server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        Self::init_tracing(&self.config);
        info!("Starting Mines API Server");
        self.run_http().await
    }

    async fn run_http(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let addr = self.socket_addr()?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Listening on http://{}", addr);
        self.log_server_info();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API Server stopped gracefully");
        Ok(())
    }

    /// Application router with the full middleware stack
    pub fn router(&self) -> axum::Router {
        let state = Arc::new(AppState {
            service: self.service.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            enable_metrics: self.config.monitoring.enable_metrics,
        });

        // Layers listed innermost first; the request id wraps everything so
        // spans and timeout responses both carry it
        create_router(state)
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_timeout))
                    .timeout(self.config.request_timeout()),
            )
            // CORS outside the timeout to answer preflight directly
            .layer(create_cors_layer(self.config.api.allowed_origins.clone()))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(axum::middleware::from_fn(request_id_middleware))
    }

    fn socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.config.api.host.parse::<std::net::IpAddr>()?,
            self.config.api.port,
        )))
    }

    fn log_server_info(&self) {
        info!("Server Configuration:");
        info!("   Store: {}", self.service.store_backend());
        info!("   Minimum bet: {}", self.config.game.minimum_bet);
        info!("   House edge: {}", self.config.game.house_edge);
        info!("   Session TTL: {}s", self.config.game.session_ttl_secs);
        info!("   CORS: {:?}", self.config.api.allowed_origins);
        info!("   Request timeout: {}s", self.config.api.request_timeout_secs);
        info!("   Metrics enabled: {}", self.config.monitoring.enable_metrics);

        info!("Available endpoints:");
        info!("   GET  /health                          - Health check");
        info!("   POST /api/mines/start                 - Start a game");
        info!("   POST /api/mines/:id/reveal            - Reveal a tile");
        info!("   POST /api/mines/:id/cashout           - Cash out");
        info!("   GET  /api/mines/:id                   - Game result");
        info!("   GET  /api/mines/schedule/:mine_count  - Payout schedule");
        info!("   POST /api/mines/verify                - Verify a finished field");
        info!("   GET  /metrics                         - Prometheus metrics");
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
