//! Request and response bodies of the REST surface.

use super::error::ApiError;
use qc_02_tx_validation::TransferRequest;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, BlockNumber, Nonce};

/// `POST /api/transaction/send`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTransactionRequest {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    #[serde(default)]
    pub fee: Amount,
    #[serde(default)]
    pub nonce: Option<Nonce>,
    /// Hex-encoded ed25519 signature, with or without `0x`.
    #[serde(default)]
    pub signature: Option<String>,
}

impl SendTransactionRequest {
    /// Decode into the ledger's request type.
    pub fn into_transfer(self) -> Result<TransferRequest, ApiError> {
        let signature = self
            .signature
            .map(|sig| {
                let digits = sig.strip_prefix("0x").unwrap_or(&sig);
                hex::decode(digits)
                    .map_err(|e| ApiError::bad_request(format!("signature is not hex: {e}")))
            })
            .transpose()?;
        Ok(TransferRequest {
            from: self.from,
            to: self.to,
            amount: self.amount,
            fee: self.fee,
            nonce: self.nonce,
            signature,
        })
    }
}

/// `POST /api/validator/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterValidatorRequest {
    pub address: Address,
    pub stake: Amount,
}

/// `POST /api/validator/unstake`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnstakeRequest {
    pub address: Address,
}

/// `POST /api/contract/deploy`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployContractRequest {
    /// Contract source or bytecode, metered by length.
    pub code: String,
    /// Constructor arguments, metered by their JSON encoding.
    #[serde(default)]
    pub args: serde_json::Value,
    pub from: Address,
}

impl DeployContractRequest {
    /// Encoded argument bytes; `null` or absent args cost nothing.
    pub fn args_bytes(&self) -> Result<Vec<u8>, ApiError> {
        if self.args.is_null() {
            return Ok(Vec::new());
        }
        serde_json::to_vec(&self.args).map_err(|e| ApiError::bad_request(e.to_string()))
    }
}

/// `?limit=N` on list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// `GET /api/wallet/{address}/balance`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub address: Address,
    pub balance: Amount,
    pub available_balance: Amount,
}

/// `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub running: bool,
    pub block_height: BlockNumber,
}
