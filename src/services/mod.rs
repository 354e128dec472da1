//! Service layer for external collaborators.
//!
//! Each collaborator (embedding service, AI advisor, vendor webhook) is a
//! trait so the pipeline can be exercised against frozen stand-ins in
//! tests; the concrete implementations are HTTP clients.

use async_trait::async_trait;

use crate::domain::VendorRecord;
use crate::error::CoreResult;

pub mod advisor;
pub mod embedding;
pub mod vendor_lookup;

pub use advisor::AdvisorClient;
pub use embedding::EmbeddingClient;
pub use vendor_lookup::VendorWebhookClient;

/// Produces fixed-length embedding vectors for text. Deterministic for
/// identical input within a process lifetime.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> CoreResult<Vec<f32>>;

    async fn embed_batch(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>>;
}

/// Large-language-model advisor. Output is untrusted free text and may be
/// malformed or truncated; callers must parse defensively.
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> CoreResult<String>;
}

/// External vendor lookup. An empty result list is a valid outcome, not an
/// error.
#[async_trait]
pub trait VendorSource: Send + Sync {
    async fn search(&self, query: &str, location: &str) -> CoreResult<Vec<VendorRecord>>;
}
