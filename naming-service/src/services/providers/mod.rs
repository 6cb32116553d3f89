//! Naming provider abstraction.
//!
//! A trait-based seam over the vision model backend so the handler can be
//! exercised against a canned provider in tests.

pub mod anthropic;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Upstream returned a non-success status. The body stays server-side.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Upstream answered 2xx but the payload did not match the contract.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Connection failure or the 30s call timeout.
    #[error("Network error: {0}")]
    Network(String),
}

/// Trait for backends that propose names for a knitting pattern image.
#[async_trait]
pub trait NamingProvider: Send + Sync {
    /// Suggest names for a base64-encoded PNG, in model output order.
    async fn suggest_names(&self, image_data: &str) -> Result<Vec<String>, ProviderError>;
}
