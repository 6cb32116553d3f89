//! Mock provider implementation for testing.

use super::{NamingProvider, ProviderError};
use async_trait::async_trait;

/// Canned naming provider for handler tests.
pub struct MockNamingProvider {
    names: Vec<String>,
    fail: bool,
}

impl MockNamingProvider {
    pub fn with_names(names: Vec<String>) -> Self {
        Self { names, fail: false }
    }

    /// A provider whose every call fails like an upstream 500.
    pub fn failing() -> Self {
        Self {
            names: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl NamingProvider for MockNamingProvider {
    async fn suggest_names(&self, _image_data: &str) -> Result<Vec<String>, ProviderError> {
        if self.fail {
            return Err(ProviderError::Api {
                status: 500,
                body: "mock upstream failure".to_string(),
            });
        }

        Ok(self.names.clone())
    }
}
