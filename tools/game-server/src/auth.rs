//! Authentication seam.
//!
//! Real identity verification (checking a session token against whatever
//! issues them) is out of scope here — `DevAuthVerifier` trusts any
//! non-empty token and derives a stable `UserId` from it, which is enough
//! to exercise everything downstream of "the socket knows who it is."

use core_types::UserId;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("empty token")]
    EmptyToken,
}

pub trait AuthVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Deterministic dev-only stand-in: the same token always maps to the same
/// `UserId`, so repeated connects from one client reattach to the same
/// identity without a real account system behind it.
pub struct DevAuthVerifier {
    namespace: Uuid,
}

impl Default for DevAuthVerifier {
    fn default() -> Self {
        Self {
            namespace: Uuid::NAMESPACE_URL,
        }
    }
}

impl AuthVerifier for DevAuthVerifier {
    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        Ok(UserId::from_uuid(Uuid::new_v5(&self.namespace, token.as_bytes())))
    }
}
