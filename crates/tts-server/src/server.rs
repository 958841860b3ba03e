//! HTTP server: routing, shared state and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use runtime::TtsPipeline;
use tts_core::{TtsError, TtsResult, config};

use crate::service;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: SocketAddr,
    /// Request body size limit in bytes.
    pub max_body_size: usize,
    /// Graceful shutdown timeout in seconds.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            max_body_size: 2 * 1024 * 1024,
            shutdown_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Build from the `server` settings section.
    pub fn from_settings(settings: &config::ServerConfig) -> TtsResult<Self> {
        let addr = format!("{}:{}", settings.host, settings.port)
            .parse::<SocketAddr>()
            .map_err(|e| {
                TtsError::config(format!(
                    "invalid server address {}:{}: {e}",
                    settings.host, settings.port
                ))
            })?;

        Ok(Self {
            addr,
            max_body_size: settings.max_body_size,
            ..Self::default()
        })
    }
}

/// Shared server state.
pub struct AppState {
    /// Request pipeline.
    pub pipeline: TtsPipeline,
    /// Prometheus handle; `/metrics` is empty without one.
    pub metrics: Option<PrometheusHandle>,
    /// Process start, for uptime.
    pub start_time: Instant,
}

impl AppState {
    /// Create state for a pipeline.
    pub fn new(pipeline: TtsPipeline, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            pipeline,
            metrics,
            start_time: Instant::now(),
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>, max_body_size: usize) -> Router {
    let writer = state.pipeline.writer();
    let audio_prefix = format!("/{}", writer.public_prefix().trim_matches('/'));
    let audio_files = ServeDir::new(writer.dir());

    let routes = Router::new()
        .route("/", get(service::index))
        .route("/synthesize", post(service::synthesize))
        .route("/synthesize/stream", post(service::synthesize_stream))
        .route("/health", get(service::health))
        .route("/healthz", get(service::health))
        .route("/ready", get(service::ready))
        .route("/info", get(service::info))
        .route("/metrics", get(service::metrics));

    let routes = if audio_prefix == "/" {
        routes.fallback_service(audio_files)
    } else {
        routes.nest_service(&audio_prefix, audio_files)
    };

    routes
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The text-to-audio HTTP server.
pub struct TtsServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl TtsServer {
    /// Create a server around a pipeline.
    pub fn new(
        config: ServerConfig,
        pipeline: TtsPipeline,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config,
            state: Arc::new(AppState::new(pipeline, metrics)),
        }
    }

    /// Run until SIGINT or SIGTERM.
    pub async fn run(self) -> TtsResult<()> {
        std::fs::create_dir_all(self.state.pipeline.writer().dir())?;

        let app = router(Arc::clone(&self.state), self.config.max_body_size);
        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;

        info!(
            addr = %self.config.addr,
            model = self.state.pipeline.model().name(),
            "HTTP server listening"
        );

        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
        });

        // Graceful shutdown waits for in-flight requests; bound the wait
        // once the signal has arrived.
        let timeout = Duration::from_secs(self.config.shutdown_timeout_secs);
        tokio::select! {
            result = &mut server => return flatten(result),
            _ = shutdown_signal() => {
                info!("Shutdown signal received, stopping server...");
            }
        }

        match tokio::time::timeout(timeout, &mut server).await {
            Ok(result) => {
                flatten(result)?;
                info!("Server stopped gracefully");
            }
            Err(_) => warn!("Shutdown timeout, forcing exit"),
        }
        Ok(())
    }
}

fn flatten(
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> TtsResult<()> {
    result.map_err(|e| TtsError::internal(format!("server task failed: {e}")))??;
    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.port(), 8000);
        assert_eq!(config.max_body_size, 2 * 1024 * 1024);
    }

    #[test]
    fn test_server_config_from_settings() {
        let settings = config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9100,
            max_body_size: 1024,
        };
        let server = ServerConfig::from_settings(&settings).unwrap();
        assert_eq!(server.addr, SocketAddr::from(([127, 0, 0, 1], 9100)));
        assert_eq!(server.max_body_size, 1024);

        let bad = config::ServerConfig {
            host: "not a host".to_string(),
            ..settings
        };
        assert!(ServerConfig::from_settings(&bad).is_err());
    }
}
