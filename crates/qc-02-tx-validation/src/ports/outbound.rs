//! Outbound ports (dependencies on the caller's environment).

use crate::domain::entities::TransferRequest;
use shared_types::{PublicKey, RejectReason};

/// Verify-on-submit authentication hook.
///
/// `public_key` is the key registered for `request.from`, if any.
pub trait TransactionAuthenticator: Send + Sync {
    fn authenticate(
        &self,
        request: &TransferRequest,
        public_key: Option<&PublicKey>,
    ) -> Result<(), RejectReason>;

    /// Short name for logs and status output.
    fn name(&self) -> &'static str;
}

/// Accepts every request. Default for the demonstration node.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveAuthenticator;

impl TransactionAuthenticator for PermissiveAuthenticator {
    fn authenticate(
        &self,
        _request: &TransferRequest,
        _public_key: Option<&PublicKey>,
    ) -> Result<(), RejectReason> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "permissive"
    }
}
