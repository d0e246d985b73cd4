//! Ed25519 signature check over the canonical transaction bytes.

use crate::domain::entities::TransferRequest;
use crate::ports::outbound::TransactionAuthenticator;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use shared_types::{Address, PublicKey, RejectReason};
use tracing::debug;

/// Requires an explicit nonce and a signature by the sender's registered key.
///
/// The key must also hash to the sender address, so a key registered under
/// the wrong address cannot authorize transfers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Authenticator;

impl TransactionAuthenticator for Ed25519Authenticator {
    fn authenticate(
        &self,
        request: &TransferRequest,
        public_key: Option<&PublicKey>,
    ) -> Result<(), RejectReason> {
        let payload = request
            .signing_payload()
            .ok_or(RejectReason::InvalidSignature)?;
        let key_bytes = public_key.ok_or(RejectReason::InvalidSignature)?;
        if Address::from_public_key(key_bytes) != request.from {
            debug!(from = %request.from, "[qc-02] Registered key does not match sender");
            return Err(RejectReason::InvalidSignature);
        }

        let signature_bytes: [u8; 64] = request
            .signature
            .as_deref()
            .ok_or(RejectReason::InvalidSignature)?
            .try_into()
            .map_err(|_| RejectReason::InvalidSignature)?;

        let key = VerifyingKey::from_bytes(key_bytes).map_err(|_| RejectReason::InvalidSignature)?;
        key.verify(&payload, &Signature::from_bytes(&signature_bytes))
            .map_err(|_| RejectReason::InvalidSignature)
    }

    fn name(&self) -> &'static str {
        "ed25519"
    }
}
