use futures_util::StreamExt;
use reqwest::Client;

use super::types::{
    CountTokensRequest, CountTokensResponse, EmbedContentRequest, EmbedContentResponse,
    GenerateContentRequest, GenerateContentResponse, WireContent,
};
use crate::generator::{ContentGenerator, ResponseStream};
use crate::providers::http_client;
use crate::sse::SseDecoder;
use crate::types::{
    ContentEmbedding, GenerationRequest, GenerationResponse, GeneratorConfig, TokenCount,
};
use crate::Error;

const GENERATIVE_LANGUAGE_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const VERTEX_BASE: &str = "https://aiplatform.googleapis.com/v1beta1";

/// Google-style backend. One adapter serves both the API-key host and the
/// enterprise (Vertex) endpoint; the flag only switches hosts.
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
    vertex: bool,
    base_url: Option<String>,
}

impl GeminiGenerator {
    pub fn new(config: &GeneratorConfig, api_key: String, vertex: bool) -> Result<Self, Error> {
        Ok(Self {
            client: http_client(config)?,
            api_key,
            model: config.model.clone(),
            vertex,
            base_url: config.base_url.clone(),
        })
    }

    fn backend_name(&self) -> &'static str {
        if self.vertex {
            "vertex"
        } else {
            "gemini"
        }
    }

    /// Endpoint for a model method; streaming rides SSE via `alt=sse`.
    fn endpoint(&self, method: &str, stream: bool) -> String {
        let base = match &self.base_url {
            Some(base) => base.trim_end_matches('/'),
            None if self.vertex => VERTEX_BASE,
            None => GENERATIVE_LANGUAGE_BASE,
        };
        let sse_param = if stream { "?alt=sse" } else { "" };
        format!("{base}/models/{}:{method}{sse_param}", self.model)
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await?;
        Err(Error::provider(
            self.backend_name(),
            format!("API error ({status}): {body}"),
        ))
    }
}

#[async_trait::async_trait]
impl ContentGenerator for GeminiGenerator {
    async fn generate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, Error> {
        let body = GenerateContentRequest::from_internal(request);
        let url = self.endpoint("generateContent", false);
        let response = self.post(&url).json(&body).send().await?;
        let response = self.check(response).await?;
        let reply: GenerateContentResponse = response.json().await?;
        Ok(GenerationResponse::from(reply))
    }

    async fn generate_content_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<ResponseStream, Error> {
        let body = GenerateContentRequest::from_internal(request);
        let url = self.endpoint("streamGenerateContent", true);
        let response = self.post(&url).json(&body).send().await?;
        let response = self.check(response).await?;

        // Chunks already arrive in the Google shape; each one maps straight
        // to a logical response with no cross-chunk reassembly needed.
        let backend = self.backend_name();
        let stream =
            SseDecoder::new(response.bytes_stream()).filter_map(move |frame_result| async move {
                match frame_result {
                    Ok(frame) => {
                        let data = frame.data.trim();
                        if data.is_empty() || frame.is_done() {
                            return None;
                        }
                        match serde_json::from_str::<GenerateContentResponse>(data) {
                            Ok(reply) => Some(Ok(GenerationResponse::from(reply))),
                            Err(err) => Some(Err(Error::provider(
                                backend,
                                format!("failed to parse stream chunk: {err}"),
                            ))),
                        }
                    }
                    Err(e) => Some(Err(e)),
                }
            });

        Ok(Box::pin(stream))
    }

    async fn count_tokens(&self, request: &GenerationRequest) -> Result<TokenCount, Error> {
        let body = CountTokensRequest {
            contents: request.contents.iter().map(WireContent::from).collect(),
        };
        let url = self.endpoint("countTokens", false);
        let response = self.post(&url).json(&body).send().await?;
        let response = self.check(response).await?;
        let reply: CountTokensResponse = response.json().await?;
        Ok(TokenCount {
            total_tokens: reply.total_tokens,
        })
    }

    async fn embed_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<ContentEmbedding, Error> {
        // The embedding endpoint takes a single content; turns are folded
        // into one.
        let parts = request
            .contents
            .iter()
            .flat_map(|content| content.parts.iter().map(super::types::WirePart::from))
            .collect();
        let body = EmbedContentRequest {
            content: WireContent {
                role: "user".to_string(),
                parts,
            },
        };
        let url = self.endpoint("embedContent", false);
        let response = self.post(&url).json(&body).send().await?;
        let response = self.check(response).await?;
        let reply: EmbedContentResponse = response.json().await?;
        Ok(ContentEmbedding {
            values: reply.embedding.values,
        })
    }
}
