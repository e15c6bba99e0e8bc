use std::pin::Pin;

use futures::Stream;

use crate::types::{ContentEmbedding, GenerationRequest, GenerationResponse, TokenCount};
use crate::Error;

/// Lazy, forward-only sequence of normalized responses from one streaming
/// call. Single-consumer and not restartable; consuming it fully is required
/// to observe completion.
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<GenerationResponse, Error>> + Send>>;

/// Capability surface implemented identically by every backend branch.
#[async_trait::async_trait]
pub trait ContentGenerator: Send + Sync + 'static {
    /// Single-shot generation; no partial results.
    async fn generate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, Error>;

    /// Streaming generation. Dropping the stream before exhaustion cancels
    /// the underlying call and releases the connection.
    async fn generate_content_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<ResponseStream, Error>;

    /// Token count for the request. A length-based estimate where the backend
    /// has no native tokenizer; monotonic in input length either way.
    async fn count_tokens(&self, request: &GenerationRequest) -> Result<TokenCount, Error>;

    /// Embedding vector for the request contents.
    async fn embed_content(&self, request: &GenerationRequest)
        -> Result<ContentEmbedding, Error>;
}
