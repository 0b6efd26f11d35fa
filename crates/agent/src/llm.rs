use async_trait::async_trait;

use storebot_core::{InferenceError, ProductRecord};

/// Transient per-request bundle handed to the gateway: everything the prompt
/// needs beyond the configured persona.
#[derive(Clone, Debug, Default)]
pub struct InferenceRequest {
    pub query: String,
    pub site_excerpt: String,
    pub brands: Vec<String>,
    pub products: Vec<ProductRecord>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError>;
}
