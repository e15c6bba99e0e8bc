use futures_util::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use genbridge::{
    AuthSelection, Content, ContentGenerator, FunctionDeclaration, GeminiGenerator,
    GenerationRequest, GeneratorConfig, GeneratorFactory, OpenAiCompatGenerator, ProviderKind,
};

fn sse_body(events: &[serde_json::Value], done_sentinel: bool) -> String {
    let mut body = String::new();
    for event in events {
        body.push_str(&format!("data: {event}\n\n"));
    }
    if done_sentinel {
        body.push_str("data: [DONE]\n\n");
    }
    body
}

fn openai_generator(server: &MockServer) -> OpenAiCompatGenerator {
    let config = GeneratorConfig::new("gpt-4o", ProviderKind::OpenAi);
    OpenAiCompatGenerator::new(&config, server.uri(), "test-key".to_string()).unwrap()
}

fn gemini_generator(server: &MockServer) -> GeminiGenerator {
    let config =
        GeneratorConfig::new("gemini-2.0-flash", ProviderKind::Gemini).with_base_url(server.uri());
    GeminiGenerator::new(&config, "g-key".to_string(), false).unwrap()
}

#[tokio::test]
async fn test_chat_generate_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "content": "Using a tool.",
                    "tool_calls": [{
                        "id": "call_42",
                        "function": {"name": "lookup", "arguments": "{\"q\":\"rust\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 4, "total_tokens": 14}
        })))
        .mount(&server)
        .await;

    let generator = openai_generator(&server);
    let request = GenerationRequest::from_text("look up rust")
        .with_tools(vec![FunctionDeclaration::new("lookup", "look a thing up")]);

    let response = generator.generate_content(&request).await.unwrap();
    assert_eq!(response.text, "Using a tool.");
    let calls = response.function_calls.unwrap();
    assert_eq!(calls[0].name, "lookup");
    assert_eq!(calls[0].args, json!({"q": "rust"}));
    assert_eq!(calls[0].id.as_deref(), Some("call_42"));
    assert_eq!(response.usage.unwrap().total_token_count, 14);
}

#[tokio::test]
async fn test_chat_stream_reassembles_split_tool_call() {
    let server = MockServer::start().await;
    let body = sse_body(
        &[
            json!({"choices": [{"delta": {"content": "Let me call a tool for that."}}]}),
            json!({"choices": [{"delta": {"tool_calls": [{
                "index": 0, "id": "call_1",
                "function": {"name": "merge", "arguments": "{\"a\":"}
            }]}}]}),
            json!({"choices": [{"delta": {"tool_calls": [{
                "index": 0, "function": {"arguments": "1,\"b\":"}
            }]}}]}),
            json!({"choices": [{"delta": {"tool_calls": [{
                "index": 0, "function": {"arguments": "2}"}
            }]}}]}),
            json!({"choices": [{"delta": {}, "finish_reason": "tool_calls"}]}),
        ],
        true,
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let generator = openai_generator(&server);
    let request = GenerationRequest::from_text("merge a and b");

    let mut stream = generator.generate_content_stream(&request).await.unwrap();
    let mut responses = Vec::new();
    while let Some(item) = stream.next().await {
        responses.push(item.unwrap());
    }

    // One interim text flush, then exactly one completion flush carrying the
    // reassembled call.
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].text, "Let me call a tool for that.");
    assert!(responses[0].function_calls.is_none());

    let calls = responses[1].function_calls.as_ref().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "merge");
    assert_eq!(calls[0].args, json!({"a": 1, "b": 2}));
}

#[tokio::test]
async fn test_chat_stream_without_done_sentinel_still_completes() {
    let server = MockServer::start().await;
    let body = sse_body(
        &[
            json!({"choices": [{"delta": {"content": "short"}}]}),
            json!({"choices": [{"delta": {}, "finish_reason": "stop"}]}),
        ],
        false,
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let generator = openai_generator(&server);
    let request = GenerationRequest::from_text("hi");

    let mut stream = generator.generate_content_stream(&request).await.unwrap();
    let mut responses = Vec::new();
    while let Some(item) = stream.next().await {
        responses.push(item.unwrap());
    }

    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].text, "short");
}

#[tokio::test]
async fn test_factory_appends_ollama_path_suffix() {
    let server = MockServer::start().await;
    // Mounted under /v1 even though the configured base URL omits it.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {"content": "local reply"},
                "finish_reason": "stop"
            }]
        })))
        .mount(&server)
        .await;

    let config =
        GeneratorConfig::new("llama3", ProviderKind::Ollama).with_base_url(server.uri());
    let generator = GeneratorFactory::new()
        .build(&config, AuthSelection::OpenAiCompatible)
        .unwrap();

    let response = generator
        .generate_content(&GenerationRequest::from_text("hi"))
        .await
        .unwrap();
    assert_eq!(response.text, "local reply");
}

#[tokio::test]
async fn test_chat_api_error_is_tagged_with_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let generator = openai_generator(&server);
    let err = generator
        .generate_content(&GenerationRequest::from_text("hi"))
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("openai"));
    assert!(message.contains("rate limited"));
}

#[tokio::test]
async fn test_chat_embeddings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [0.25, -0.5, 1.0]}]
        })))
        .mount(&server)
        .await;

    let generator = openai_generator(&server);
    let embedding = generator
        .embed_content(&GenerationRequest::from_text("embed me"))
        .await
        .unwrap();
    assert_eq!(embedding.values, vec![0.25, -0.5, 1.0]);
}

#[tokio::test]
async fn test_gemini_generate_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "g-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Bonjour."}]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2, "totalTokenCount": 5}
        })))
        .mount(&server)
        .await;

    let generator = gemini_generator(&server);
    let response = generator
        .generate_content(&GenerationRequest::from_text("say hello in French"))
        .await
        .unwrap();
    assert_eq!(response.text, "Bonjour.");
    assert_eq!(response.usage.unwrap().total_token_count, 5);
}

#[tokio::test]
async fn test_gemini_streaming_chunks_map_one_to_one() {
    let server = MockServer::start().await;
    let body = sse_body(
        &[
            json!({"candidates": [{"content": {"role": "model", "parts": [{"text": "Hello"}]}}]}),
            json!({"candidates": [{
                "content": {"role": "model", "parts": [{"text": " world"}]},
                "finishReason": "STOP"
            }]}),
        ],
        false,
    );
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:streamGenerateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let generator = gemini_generator(&server);
    let mut stream = generator
        .generate_content_stream(&GenerationRequest::from_text("hi"))
        .await
        .unwrap();

    let mut responses = Vec::new();
    while let Some(item) = stream.next().await {
        responses.push(item.unwrap());
    }
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].text, "Hello");
    assert_eq!(responses[1].text, " world");
    assert!(responses[1].finish_reason.is_some());
}

#[tokio::test]
async fn test_gemini_native_count_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:countTokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalTokens": 42})))
        .mount(&server)
        .await;

    let generator = gemini_generator(&server);
    let count = generator
        .count_tokens(&GenerationRequest::from_text("count me"))
        .await
        .unwrap();
    assert_eq!(count.total_tokens, 42);
}

#[tokio::test]
async fn test_gemini_embed_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:embedContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": {"values": [0.5, 0.25]}
        })))
        .mount(&server)
        .await;

    let generator = gemini_generator(&server);
    let embedding = generator
        .embed_content(&GenerationRequest::from_text("embed me"))
        .await
        .unwrap();
    assert_eq!(embedding.values, vec![0.5, 0.25]);
}

#[tokio::test]
async fn test_tool_response_round_trips_as_tool_message() {
    let server = MockServer::start().await;
    // The translated request must carry the tool role and the matching
    // tool_call_id for a function-response turn.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "user", "content": "look it up"},
                {"role": "tool", "content": "sunny", "tool_call_id": "call_9"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {"content": "It is sunny."},
                "finish_reason": "stop"
            }]
        })))
        .mount(&server)
        .await;

    let generator = openai_generator(&server);
    let request = GenerationRequest::new(vec![
        Content::user_text("look it up"),
        Content::tool_response("call_9", "get_weather", json!({"output": "sunny"})),
    ]);

    let response = generator.generate_content(&request).await.unwrap();
    assert_eq!(response.text, "It is sunny.");
}
