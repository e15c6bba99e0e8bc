use futures_util::StreamExt;
use reqwest::Client;

use super::assemble::ResponseAssembler;
use super::stream::StreamNormalizer;
use super::translate;
use super::types::{ChatChunk, ChatResponse, EmbeddingsRequest, EmbeddingsResponse};
use crate::auth::ProviderKind;
use crate::generator::{ContentGenerator, ResponseStream};
use crate::providers::http_client;
use crate::sse::SseDecoder;
use crate::types::{
    ContentEmbedding, GenerationRequest, GenerationResponse, GeneratorConfig, Part, TokenCount,
};
use crate::Error;

/// Rough characters-per-token divisor for the length-based estimate; none of
/// the chat backends expose a tokenizer endpoint.
const ESTIMATE_CHARS_PER_TOKEN: usize = 4;

/// Adapter serving the whole OpenAI-compatible family. Aliases differ only in
/// the base URL and credential the factory resolves before construction.
pub struct OpenAiCompatGenerator {
    client: Client,
    provider: ProviderKind,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiCompatGenerator {
    /// `base_url` and `api_key` arrive fully resolved from the factory. An
    /// empty key is the local variant; it sends no Authorization header.
    pub fn new(
        config: &GeneratorConfig,
        base_url: String,
        api_key: String,
    ) -> Result<Self, Error> {
        Ok(Self {
            client: http_client(config)?,
            provider: config.provider,
            api_key,
            base_url,
            model: config.model.clone(),
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("Content-Type", "application/json");
        if !self.api_key.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.api_key));
        }
        builder
    }

    /// Surface a non-success reply as a provider error tagged with the
    /// backend name.
    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await?;
        Err(Error::provider(
            self.provider.as_str(),
            format!("API error ({status}): {body}"),
        ))
    }
}

#[async_trait::async_trait]
impl ContentGenerator for OpenAiCompatGenerator {
    async fn generate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, Error> {
        let body = translate::to_chat_request(request, &self.model);
        let response = self.post("/chat/completions").json(&body).send().await?;
        let response = self.check(response).await?;
        let reply: ChatResponse = response.json().await?;
        Ok(ResponseAssembler::from_chat_response(reply))
    }

    async fn generate_content_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<ResponseStream, Error> {
        let mut body = translate::to_chat_request(request, &self.model);
        body.stream = Some(true);
        let response = self.post("/chat/completions").json(&body).send().await?;
        let response = self.check(response).await?;

        let provider = self.provider;
        let mut normalizer = StreamNormalizer::new();

        // The trailing None drives a residual flush for providers that close
        // the stream without a [DONE] sentinel.
        let frames = SseDecoder::new(response.bytes_stream())
            .map(Some)
            .chain(futures_util::stream::once(std::future::ready(None)));

        let stream = frames
            .map(move |item| {
                let emitted: Vec<Result<GenerationResponse, Error>> = match item {
                    Some(Ok(frame)) => {
                        let data = frame.data.trim();
                        if data.is_empty() {
                            Vec::new()
                        } else if frame.is_done() {
                            normalizer.finish().map(Ok).into_iter().collect()
                        } else {
                            match serde_json::from_str::<ChatChunk>(data) {
                                Ok(chunk) => {
                                    normalizer.push_chunk(&chunk).map(Ok).into_iter().collect()
                                }
                                Err(err) => vec![Err(Error::provider(
                                    provider.as_str(),
                                    format!("failed to parse stream chunk: {err}"),
                                ))],
                            }
                        }
                    }
                    Some(Err(e)) => vec![Err(e)],
                    None => normalizer.finish().map(Ok).into_iter().collect(),
                };
                futures_util::stream::iter(emitted)
            })
            .flatten();

        Ok(Box::pin(stream))
    }

    async fn count_tokens(&self, request: &GenerationRequest) -> Result<TokenCount, Error> {
        let chars: usize = request
            .contents
            .iter()
            .flat_map(|content| &content.parts)
            .map(part_text_len)
            .sum();
        Ok(TokenCount {
            total_tokens: chars.div_ceil(ESTIMATE_CHARS_PER_TOKEN) as u32,
        })
    }

    async fn embed_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<ContentEmbedding, Error> {
        let input: String = request
            .contents
            .iter()
            .flat_map(|content| &content.parts)
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        let body = EmbeddingsRequest {
            model: self.model.clone(),
            input,
        };
        let response = self.post("/embeddings").json(&body).send().await?;
        let response = self.check(response).await?;
        let reply: EmbeddingsResponse = response.json().await?;
        let row = reply.data.into_iter().next().ok_or_else(|| {
            Error::provider(self.provider.as_str(), "embeddings reply carried no rows")
        })?;
        Ok(ContentEmbedding {
            values: row.embedding,
        })
    }
}

fn part_text_len(part: &Part) -> usize {
    match part {
        Part::Text { text } => text.len(),
        Part::FunctionCall { function_call } => {
            function_call.name.len() + function_call.args.to_string().len()
        }
        Part::FunctionResponse { function_response } => {
            function_response.response.to_string().len()
        }
    }
}
