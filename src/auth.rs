//! Admin authorization gate.
//!
//! The store treats authorization as an opaque capability: mutating
//! operations receive a token string (or nothing) and consult an
//! [`Authorizer`] before touching the filesystem. How the token travels —
//! bearer header, cookie, CLI config — is the transport's business, not the
//! store's.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Binary capability check consumed by the store's mutating operations.
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, token: Option<&str>) -> bool;
}

/// Gate that accepts the single admin token configured for the deployment.
pub struct SharedSecretAuth {
    token: String,
}

impl SharedSecretAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Authorizer for SharedSecretAuth {
    fn is_authorized(&self, token: Option<&str>) -> bool {
        if self.token.is_empty() {
            // An unset secret locks mutations out entirely rather than
            // accepting an empty presented token.
            return false;
        }
        match token {
            Some(presented) => constant_time_eq(presented.as_bytes(), self.token.as_bytes()),
            None => false,
        }
    }
}

/// Compares two byte strings without leaking the position of the first
/// mismatch through timing: both sides are folded through HMAC-SHA256 with a
/// fixed key and the fixed-width digests are compared instead.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let digest = |data: &[u8]| {
        let mut mac = HmacSha256::new_from_slice(b"report-vault.auth.v1")
            .expect("HMAC can take key of any size");
        mac.update(data);
        mac.finalize().into_bytes()
    };
    digest(a) == digest(b)
}
