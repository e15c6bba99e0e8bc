//! Streaming generation with a tool declared: prints interim text as it
//! arrives and any reassembled tool calls at completion.

use futures_util::StreamExt;
use serde_json::json;

use genbridge::{
    resolve, ContentGenerator, EnvSnapshot, FunctionDeclaration, GenerationRequest,
    GeneratorConfig, GeneratorFactory, ProviderKind,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = EnvSnapshot::from_process();
    let auth = resolve(None, None, &env)?;
    let provider = match (env.provider, auth) {
        (Some(kind), _) => kind,
        (None, genbridge::AuthSelection::OpenAiCompatible) => ProviderKind::OpenAi,
        _ => ProviderKind::Gemini,
    };
    let model = if provider.is_openai_compatible() {
        "gpt-4o-mini"
    } else {
        "gemini-2.0-flash"
    };
    let config = GeneratorConfig::from_env(model, provider, &env);
    let generator = GeneratorFactory::new().build(&config, auth)?;

    let weather_tool = FunctionDeclaration::new("get_weather", "Current weather for a city")
        .with_parameters(json!({
            "type": "OBJECT",
            "properties": {"city": {"type": "STRING"}},
            "required": ["city"]
        }));

    let request = GenerationRequest::from_text("What's the weather in Paris right now?")
        .with_tools(vec![weather_tool]);

    let mut stream = generator.generate_content_stream(&request).await?;
    while let Some(item) = stream.next().await {
        let response = item?;
        if !response.text.is_empty() {
            print!("{}", response.text);
        }
        for call in response.function_calls.iter().flatten() {
            println!("\n-> tool call: {}({})", call.name, call.args);
        }
        if let Some(reason) = response.finish_reason {
            println!("\n[finished: {reason:?}]");
        }
    }
    Ok(())
}
