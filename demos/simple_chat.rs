//! Minimal end-to-end usage: resolve a backend from the environment, build a
//! generator, and run one non-streaming request.
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run --example simple_chat
//! # or
//! PROVIDER_TYPE=ollama cargo run --example simple_chat
//! ```

use genbridge::{
    resolve, AuthSelection, ContentGenerator, EnvSnapshot, GenerationRequest, GeneratorConfig,
    GeneratorFactory, ProviderKind,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = EnvSnapshot::from_process();
    let auth = resolve(None, None, &env)?;
    println!("Resolved backend: {auth}");

    let provider = match (env.provider, auth) {
        (Some(kind), _) => kind,
        (None, AuthSelection::OpenAiCompatible) => ProviderKind::OpenAi,
        _ => ProviderKind::Gemini,
    };
    let model = match auth {
        AuthSelection::OpenAiCompatible => "gpt-4o-mini",
        _ => "gemini-2.0-flash",
    };
    let config = GeneratorConfig::from_env(model, provider, &env);

    let generator = GeneratorFactory::new().build(&config, auth)?;
    let request = GenerationRequest::from_text("In one sentence, what is a borrow checker?");

    let tokens = generator.count_tokens(&request).await?;
    println!("Prompt is ~{} tokens", tokens.total_tokens);

    let response = generator.generate_content(&request).await?;
    println!("{}", response.text);
    Ok(())
}
