use crate::config::NamingConfig;
use crate::handlers;
use crate::services::providers::anthropic::AnthropicProvider;
use crate::services::providers::NamingProvider;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::body_limit::{body_limit_middleware, BodyLimit};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: NamingConfig,
    pub provider: Arc<dyn NamingProvider>,
}

/// Assemble the service router.
///
/// Unmatched paths fall through to the static frontend bundle; the declared
/// body-size guard wraps everything, so an oversized upload is rejected no
/// matter which route it targets.
pub fn build_router(state: AppState) -> Router {
    let body_limit = BodyLimit {
        max_bytes: state.config.limits.max_body_bytes,
    };
    let static_files = ServeDir::new(&state.config.assets.static_dir);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/names", post(handlers::suggest_names))
        .fallback_service(static_files)
        .layer(from_fn_with_state(body_limit, body_limit_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>,
}

impl Application {
    pub async fn build(config: NamingConfig) -> Result<Self, AppError> {
        let provider: Arc<dyn NamingProvider> =
            Arc::new(AnthropicProvider::new(config.anthropic.clone()));

        tracing::info!(
            model = %config.anthropic.model,
            api_base_url = %config.anthropic.api_base_url,
            "Initialized Anthropic naming provider"
        );

        let state = AppState {
            config: config.clone(),
            provider,
        };

        let app = build_router(state);

        // Port 0 gives a random port for testing.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .into_future();

        Ok(Self {
            port,
            server: Box::pin(server),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
