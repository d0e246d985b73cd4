//! Validation inputs and outputs.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, Nonce, RejectReason, Transaction};

/// A transfer as submitted by a client, before any checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    #[serde(default)]
    pub fee: Amount,
    /// When absent the expected nonce is assigned.
    #[serde(default)]
    pub nonce: Option<Nonce>,
    /// Ed25519 signature over the canonical transaction bytes.
    #[serde(default)]
    pub signature: Option<Vec<u8>>,
}

impl TransferRequest {
    /// Unsigned, fee-less transfer with an assigned nonce.
    #[must_use]
    pub fn simple(from: Address, to: Address, amount: Amount) -> Self {
        Self {
            from,
            to,
            amount,
            fee: 0,
            nonce: None,
            signature: None,
        }
    }

    #[must_use]
    pub fn with_fee(mut self, fee: Amount) -> Self {
        self.fee = fee;
        self
    }

    #[must_use]
    pub fn with_nonce(mut self, nonce: Nonce) -> Self {
        self.nonce = Some(nonce);
        self
    }

    #[must_use]
    pub fn with_signature(mut self, signature: Vec<u8>) -> Self {
        self.signature = Some(signature);
        self
    }

    /// The bytes a wallet signs for this request.
    ///
    /// `None` when no nonce was supplied: a signature must commit to one.
    #[must_use]
    pub fn signing_payload(&self) -> Option<Vec<u8>> {
        self.nonce.map(|nonce| {
            Transaction::canonical_bytes(&self.from, &self.to, self.amount, nonce, self.fee)
        })
    }
}

/// What the mempool currently holds for one sender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingContext {
    /// Pending transactions from the sender.
    pub count: u64,
    /// Sum of `amount + fee` over those transactions.
    pub debits: Amount,
}

/// Tagged validation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// A fully formed pending transaction carrying the reserved nonce.
    Accepted(Transaction),
    Rejected(RejectReason),
}

impl ValidationOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn into_result(self) -> Result<Transaction, RejectReason> {
        match self {
            Self::Accepted(tx) => Ok(tx),
            Self::Rejected(reason) => Err(reason),
        }
    }
}
