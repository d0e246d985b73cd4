//! REST handlers. Each one is a thin call into the ledger facade.

use crate::domain::config::LimitsConfig;
use crate::domain::error::ApiError;
use crate::domain::types::{
    BalanceResponse, DeployContractRequest, HealthResponse, ListQuery, RegisterValidatorRequest,
    SendTransactionRequest, UnstakeRequest,
};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use qc_06_ledger::{AccountSummary, Ledger, NodeStatus, WalletCreated};
use serde::de::DeserializeOwned;
use shared_types::{
    Address, Block, BlockNumber, ContractDeployment, Hash, LedgerStats, Transaction, Validator,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub limits: LimitsConfig,
    /// WebSocket keep-alive period.
    pub ping_interval: Duration,
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn body<T: DeserializeOwned>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::payload_too_large(rejection.body_text()),
            _ => ApiError::bad_request(rejection.body_text()),
        })
}

fn limit(state: &AppState, query: Result<Query<ListQuery>, QueryRejection>) -> Result<usize, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    Ok(state.limits.clamp(query.limit))
}

fn parse<T>(raw: &str, what: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| ApiError::bad_request(format!("invalid {what} '{raw}': {e}")))
}

// =============================================================================
// HEALTH & STATS
// =============================================================================

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.ledger.status();
    Json(HealthResponse {
        status: "ok".to_string(),
        running: status.running,
        block_height: status.block_height,
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<LedgerStats> {
    Json(state.ledger.get_stats())
}

// =============================================================================
// WALLETS
// =============================================================================

pub async fn create_wallet(State(state): State<AppState>) -> ApiResult<WalletCreated> {
    let wallet = state.ledger.create_wallet()?;
    debug!(address = %wallet.address, "[qc-07] Wallet created");
    Ok(Json(wallet))
}

pub async fn get_wallet(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<AccountSummary> {
    let address: Address = parse(&address, "address")?;
    Ok(Json(state.ledger.get_account(&address)?))
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<BalanceResponse> {
    let address: Address = parse(&address, "address")?;
    let account = state.ledger.get_account(&address)?;
    Ok(Json(BalanceResponse {
        address,
        balance: account.balance,
        available_balance: account.available_balance,
    }))
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

pub async fn send_transaction(
    State(state): State<AppState>,
    payload: Result<Json<SendTransactionRequest>, JsonRejection>,
) -> ApiResult<Transaction> {
    let request = body(payload)?.into_transfer()?;
    let tx = state.ledger.submit_transaction(request)?;
    debug!(hash = %tx.hash, "[qc-07] Transaction accepted");
    Ok(Json(tx))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<Transaction>> {
    let limit = limit(&state, query)?;
    Ok(Json(state.ledger.recent_transactions(limit)))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> ApiResult<Transaction> {
    let hash: Hash = parse(&hash, "transaction hash")?;
    Ok(Json(state.ledger.get_transaction(&hash)?))
}

// =============================================================================
// BLOCKS
// =============================================================================

pub async fn list_blocks(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<Block>> {
    let limit = limit(&state, query)?;
    let blocks = state
        .ledger
        .recent_blocks(limit)
        .iter()
        .map(|block| Block::clone(block))
        .collect();
    Ok(Json(blocks))
}

pub async fn get_block(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> ApiResult<Block> {
    let number: BlockNumber = parse(&number, "block number")?;
    let block = state.ledger.get_block(number)?;
    Ok(Json(Block::clone(&block)))
}

// =============================================================================
// VALIDATORS
// =============================================================================

pub async fn register_validator(
    State(state): State<AppState>,
    payload: Result<Json<RegisterValidatorRequest>, JsonRejection>,
) -> ApiResult<Validator> {
    let request = body(payload)?;
    let validator = state
        .ledger
        .register_validator(request.address, request.stake)?;
    Ok(Json(validator))
}

pub async fn unstake_validator(
    State(state): State<AppState>,
    payload: Result<Json<UnstakeRequest>, JsonRejection>,
) -> ApiResult<Validator> {
    let request = body(payload)?;
    Ok(Json(state.ledger.unstake_validator(&request.address)?))
}

pub async fn list_validators(State(state): State<AppState>) -> Json<Vec<Validator>> {
    Json(state.ledger.list_validators())
}

// =============================================================================
// CONTRACTS
// =============================================================================

pub async fn deploy_contract(
    State(state): State<AppState>,
    payload: Result<Json<DeployContractRequest>, JsonRejection>,
) -> ApiResult<ContractDeployment> {
    let request = body(payload)?;
    let args = request.args_bytes()?;
    let deployment = state
        .ledger
        .deploy_contract(request.from, request.code.as_bytes(), &args)?;
    Ok(Json(deployment))
}

// =============================================================================
// NODE CONTROL
// =============================================================================

pub async fn node_start(State(state): State<AppState>) -> ApiResult<NodeStatus> {
    state.ledger.start()?;
    info!("[qc-07] Node started via API");
    Ok(Json(state.ledger.status()))
}

pub async fn node_stop(State(state): State<AppState>) -> Json<NodeStatus> {
    state.ledger.stop();
    info!("[qc-07] Node stopped via API");
    Json(state.ledger.status())
}

pub async fn node_status(State(state): State<AppState>) -> Json<NodeStatus> {
    Json(state.ledger.status())
}
