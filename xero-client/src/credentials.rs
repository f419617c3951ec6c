//! Request signing capability
//!
//! OAuth workflows live outside this crate. Operations consume an opaque
//! signer whose only obligation is to produce authentication headers for a
//! request descriptor — the trait's shape makes it impossible for an
//! implementation to rewrite the URI, method or body.

use crate::error::Result;
use crate::transport::RequestDescriptor;

/// Attaches authentication metadata to outbound requests.
pub trait RequestSigner: Send + Sync {
    /// Produce the authentication headers for `request`.
    ///
    /// The descriptor is read-only: signers may derive signatures from the
    /// URI, method and body, but the returned headers are the only thing
    /// they contribute to the exchange.
    fn sign(&self, request: &RequestDescriptor) -> Result<Vec<(String, String)>>;
}

/// Bearer-token signer for private integrations and tests.
#[derive(Debug, Clone)]
pub struct StaticTokenSigner {
    token: String,
}

impl StaticTokenSigner {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl RequestSigner for StaticTokenSigner {
    fn sign(&self, _request: &RequestDescriptor) -> Result<Vec<(String, String)>> {
        Ok(vec![(
            "Authorization".to_string(),
            format!("Bearer {}", self.token),
        )])
    }
}
