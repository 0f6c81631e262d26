//! Gateway returning a fixed reply, for offline runs and tests.

use async_trait::async_trait;
use tracing::debug;

use super::CompletionGateway;
use crate::Result;

/// Gateway that answers every prompt with the same reply.
#[derive(Debug, Clone)]
pub struct StaticGateway {
    reply: String,
}

impl StaticGateway {
    /// Create a gateway that always returns `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl CompletionGateway for StaticGateway {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            "Static gateway answering {} char prompt with {} char reply",
            prompt.len(),
            self.reply.len()
        );
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
