//! QC-07 API Gateway - REST and WebSocket interface to the ledger.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    API GATEWAY (qc-07)                    │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐                  ┌─────────────┐        │
//! │  │  REST /api  │                  │  WebSocket  │        │
//! │  │  Port 3001  │                  │     /ws     │        │
//! │  └──────┬──────┘                  └──────┬──────┘        │
//! │  ┌──────┴────────────────────────────────┴──────┐        │
//! │  │              Middleware Stack                 │        │
//! │  │   Trace → CORS → Timeout → Body limit         │        │
//! │  └──────────────────────┬────────────────────────┘        │
//! └─────────────────────────┼────────────────────────────────┘
//!                           │
//!                 Arc<Ledger> (qc-06)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use qc_07_api_gateway::{ApiGatewayService, GatewayConfig};
//!
//! let service = ApiGatewayService::new(GatewayConfig::default(), ledger)?;
//! service.serve(shutdown_signal).await?;
//! ```
//!
//! Errors are rendered as `{"error": "...", "code": "..."}` with the status
//! mapping documented on [`ApiError`].

pub mod domain;
pub mod middleware;
pub mod rest;
pub mod service;
pub mod ws;

pub use domain::config::{
    ConfigError, CorsConfig, GatewayConfig, HttpConfig, LimitsConfig, WebSocketConfig,
};
pub use domain::error::{ApiError, ErrorBody, GatewayError};
pub use rest::AppState;
pub use service::ApiGatewayService;
