//! API Gateway service: builds the router and serves it.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::create_cors_layer;
use crate::rest::{self, AppState};
use crate::ws;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use qc_06_ledger::Ledger;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// API Gateway service state
pub struct ApiGatewayService {
    config: GatewayConfig,
    ledger: Arc<Ledger>,
}

impl ApiGatewayService {
    /// Create a new API Gateway service
    pub fn new(config: GatewayConfig, ledger: Arc<Ledger>) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;
        Ok(Self { config, ledger })
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// REST and WebSocket routes behind the middleware stack.
    pub fn router(&self) -> Router {
        let state = AppState {
            ledger: Arc::clone(&self.ledger),
            limits: self.config.limits.clone(),
            ping_interval: Duration::from_secs(self.config.websocket.ping_interval_secs),
        };

        // Body size is enforced by the extractors; TimeoutLayer needs a
        // `Default` response body.
        let middleware = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(create_cors_layer(&self.config.cors))
            .layer(TimeoutLayer::new(self.config.request_timeout()));

        rest::routes()
            .route("/ws", get(ws::ws_upgrade))
            .layer(DefaultBodyLimit::max(self.config.limits.max_request_size))
            .layer(middleware)
            .with_state(state)
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        info!(addr = ?listener.local_addr().ok(), "[qc-07] API Gateway listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("[qc-07] API Gateway stopped");
        Ok(())
    }
}
