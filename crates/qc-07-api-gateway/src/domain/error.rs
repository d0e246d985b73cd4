//! API Gateway error types and their HTTP mapping.
//!
//! | Ledger error | Status |
//! |--------------|--------|
//! | `Validation`, `InvalidAmount`, `InsufficientFunds`, `StakeTooLow`, `InvalidSignature`, `AlreadyRunning` | 400 |
//! | `UnknownEntity` | 404 |
//! | `NonceMismatch`, `DuplicateTransaction`, `DuplicateValidator`, `ValidatorSetFull` | 409 |
//! | `MempoolFull`, `NodeNotRunning` | 503 |
//! | `ChainCorrupted` | 500 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qc_06_ledger::LedgerError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error codes returned in the `code` field.
pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";
    pub const VALIDATION: &str = "validation_error";
    pub const INVALID_AMOUNT: &str = "invalid_amount";
    pub const INSUFFICIENT_FUNDS: &str = "insufficient_funds";
    pub const NONCE_MISMATCH: &str = "nonce_mismatch";
    pub const INVALID_SIGNATURE: &str = "invalid_signature";
    pub const MEMPOOL_FULL: &str = "mempool_full";
    pub const DUPLICATE_TRANSACTION: &str = "duplicate_transaction";
    pub const STAKE_TOO_LOW: &str = "stake_too_low";
    pub const DUPLICATE_VALIDATOR: &str = "duplicate_validator";
    pub const VALIDATOR_SET_FULL: &str = "validator_set_full";
    pub const NOT_FOUND: &str = "not_found";
    pub const NODE_NOT_RUNNING: &str = "node_not_running";
    pub const ALREADY_RUNNING: &str = "already_running";
    pub const INTERNAL: &str = "internal_error";
}

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// Malformed path, query or body.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, codes::PAYLOAD_TOO_LARGE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL, message)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let (status, code) = match &err {
            LedgerError::Validation(_) => (StatusCode::BAD_REQUEST, codes::VALIDATION),
            LedgerError::InvalidAmount => (StatusCode::BAD_REQUEST, codes::INVALID_AMOUNT),
            LedgerError::InsufficientFunds { .. } => {
                (StatusCode::BAD_REQUEST, codes::INSUFFICIENT_FUNDS)
            }
            LedgerError::InvalidSignature => (StatusCode::BAD_REQUEST, codes::INVALID_SIGNATURE),
            LedgerError::StakeTooLow { .. } => (StatusCode::BAD_REQUEST, codes::STAKE_TOO_LOW),
            LedgerError::AlreadyRunning => (StatusCode::BAD_REQUEST, codes::ALREADY_RUNNING),
            LedgerError::UnknownEntity { .. } => (StatusCode::NOT_FOUND, codes::NOT_FOUND),
            LedgerError::NonceMismatch { .. } => (StatusCode::CONFLICT, codes::NONCE_MISMATCH),
            LedgerError::DuplicateTransaction => {
                (StatusCode::CONFLICT, codes::DUPLICATE_TRANSACTION)
            }
            LedgerError::DuplicateValidator(_) => {
                (StatusCode::CONFLICT, codes::DUPLICATE_VALIDATOR)
            }
            LedgerError::ValidatorSetFull { .. } => {
                (StatusCode::CONFLICT, codes::VALIDATOR_SET_FULL)
            }
            LedgerError::MempoolFull { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, codes::MEMPOOL_FULL)
            }
            LedgerError::NodeNotRunning => {
                (StatusCode::SERVICE_UNAVAILABLE, codes::NODE_NOT_RUNNING)
            }
            LedgerError::ChainCorrupted { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL)
            }
        };
        Self::new(status, code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Gateway service errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server stopped with an I/O error
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Address;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (LedgerError::InvalidAmount, StatusCode::BAD_REQUEST),
            (
                LedgerError::InsufficientFunds {
                    available: 1,
                    required: 2,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                LedgerError::NonceMismatch {
                    expected: 1,
                    got: 0,
                },
                StatusCode::CONFLICT,
            ),
            (
                LedgerError::DuplicateValidator(Address::ZERO),
                StatusCode::CONFLICT,
            ),
            (LedgerError::ValidatorSetFull { max: 4 }, StatusCode::CONFLICT),
            (
                LedgerError::MempoolFull { capacity: 8 },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (LedgerError::NodeNotRunning, StatusCode::SERVICE_UNAVAILABLE),
            (
                LedgerError::corrupted(3, "bad link"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err.clone()).status, status, "{err}");
        }
    }

    #[test]
    fn test_message_preserved() {
        let err = ApiError::from(LedgerError::StakeTooLow {
            stake: 10,
            minimum: 32,
        });
        assert_eq!(err.code, codes::STAKE_TOO_LOW);
        assert_eq!(err.message, "stake 10 below minimum 32");
    }
}
