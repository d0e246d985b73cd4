//! REST surface under `/api`.

pub mod handlers;

pub use handlers::AppState;

use axum::routing::{get, post};
use axum::Router;

/// Every `/api` route.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/stats", get(handlers::stats))
        .route("/api/wallet/create", post(handlers::create_wallet))
        .route("/api/wallet/:address", get(handlers::get_wallet))
        .route("/api/wallet/:address/balance", get(handlers::get_balance))
        .route("/api/transaction/send", post(handlers::send_transaction))
        .route("/api/transaction/:hash", get(handlers::get_transaction))
        .route("/api/transactions", get(handlers::list_transactions))
        .route("/api/blocks", get(handlers::list_blocks))
        .route("/api/block/:number", get(handlers::get_block))
        .route("/api/validator/register", post(handlers::register_validator))
        .route("/api/validator/unstake", post(handlers::unstake_validator))
        .route("/api/validators", get(handlers::list_validators))
        .route("/api/contract/deploy", post(handlers::deploy_contract))
        .route("/api/node/start", post(handlers::node_start))
        .route("/api/node/stop", post(handlers::node_stop))
        .route("/api/node/status", get(handlers::node_status))
}
