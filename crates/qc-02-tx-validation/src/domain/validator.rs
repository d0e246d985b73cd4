//! # Transaction Validator
//!
//! Stateless admission rules. The caller supplies every input; nothing here
//! reads or writes shared state, so the same inputs always give the same
//! outcome.

use super::entities::{PendingContext, TransferRequest, ValidationOutcome};
use crate::ports::outbound::{PermissiveAuthenticator, TransactionAuthenticator};
use shared_types::{Account, PublicKey, RejectReason, Timestamp, Transaction};
use std::sync::Arc;
use tracing::trace;

/// Admission rules engine.
#[derive(Clone)]
pub struct TransactionValidator {
    authenticator: Arc<dyn TransactionAuthenticator>,
}

impl TransactionValidator {
    pub fn new(authenticator: Arc<dyn TransactionAuthenticator>) -> Self {
        Self { authenticator }
    }

    /// Validator that skips signature checks.
    #[must_use]
    pub fn permissive() -> Self {
        Self::new(Arc::new(PermissiveAuthenticator))
    }

    #[must_use]
    pub fn authenticator_name(&self) -> &'static str {
        self.authenticator.name()
    }

    /// Check `request` against the sender's snapshot and pending context.
    ///
    /// `sender` is `None` when the account does not exist.
    pub fn validate(
        &self,
        request: &TransferRequest,
        sender: Option<&Account>,
        pending: PendingContext,
        public_key: Option<&PublicKey>,
        now: Timestamp,
    ) -> ValidationOutcome {
        match self.check(request, sender, pending, public_key) {
            Ok(nonce) => ValidationOutcome::Accepted(Transaction::new(
                request.from,
                request.to,
                request.amount,
                nonce,
                request.fee,
                now,
            )),
            Err(reason) => {
                trace!(from = %request.from, %reason, "[qc-02] Request rejected");
                ValidationOutcome::Rejected(reason)
            }
        }
    }

    fn check(
        &self,
        request: &TransferRequest,
        sender: Option<&Account>,
        pending: PendingContext,
        public_key: Option<&PublicKey>,
    ) -> Result<u64, RejectReason> {
        if request.amount == 0 {
            return Err(RejectReason::InvalidAmount);
        }
        let required = request
            .amount
            .checked_add(request.fee)
            .ok_or(RejectReason::InvalidAmount)?;

        let account = sender.ok_or(RejectReason::UnknownSender)?;

        self.authenticator.authenticate(request, public_key)?;

        let available = account.balance.saturating_sub(pending.debits);
        if available < required {
            return Err(RejectReason::InsufficientFunds {
                available,
                required,
            });
        }

        let expected = account.nonce + pending.count;
        let nonce = request.nonce.unwrap_or(expected);
        if nonce != expected {
            return Err(RejectReason::NonceMismatch {
                expected,
                got: nonce,
            });
        }

        Ok(nonce)
    }
}

impl Default for TransactionValidator {
    fn default() -> Self {
        Self::permissive()
    }
}
