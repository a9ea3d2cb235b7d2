use async_trait::async_trait;

use crate::error::Result;

/// Interface to the external text-generation service.
///
/// A request carries a fixed system instruction plus an assembled user
/// instruction; the response is raw text the caller decodes itself. The
/// service does not validate any schema the instruction asks for.
///
/// The pipeline only depends on this trait, so tests can run it end-to-end
/// against a canned backend with no network.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}
