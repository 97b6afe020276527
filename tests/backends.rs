use chatform::{
    builder::{ChatBackend, ChatBuilder},
    chat::ChatMessage,
    extract::extract,
    schema::{FieldBuilder, Schema},
};

// Backend configuration struct to hold backend-specific settings
#[derive(Debug, Clone)]
struct BackendConfig {
    backend: ChatBackend,
    env_key: &'static str,
    model: &'static str,
    backend_name: &'static str,
}

// Define all backend configurations; the env value is the API key for the
// hosted backend and the base URL for the local one
fn get_backend_configs() -> Vec<BackendConfig> {
    vec![
        BackendConfig {
            backend: ChatBackend::HuggingFace,
            env_key: "HF_TOKEN",
            model: "google/gemma-2-2b-it",
            backend_name: "huggingface",
        },
        BackendConfig {
            backend: ChatBackend::Ollama,
            env_key: "OLLAMA_URL",
            model: "gemma2:2b",
            backend_name: "ollama",
        },
    ]
}

fn configure(builder: ChatBuilder, config: &BackendConfig, secret: String) -> ChatBuilder {
    match config.backend {
        ChatBackend::HuggingFace => builder.api_key(secret),
        ChatBackend::Ollama => builder.base_url(secret),
    }
}

// Generic test function for chat functionality
async fn test_chat_generic(config: &BackendConfig) -> Result<(), Box<dyn std::error::Error>> {
    let secret = match std::env::var(config.env_key) {
        Ok(value) => value,
        Err(_) => {
            eprintln!(
                "test test_{}_chat ... ignored, {} not set",
                config.backend_name, config.env_key
            );
            return Ok(());
        }
    };

    let builder = ChatBuilder::new()
        .backend(config.backend.clone())
        .model(config.model)
        .max_tokens(256)
        .temperature(0.7);
    let llm = configure(builder, config, secret)
        .build()
        .expect("Failed to build chat client");

    let messages = vec![ChatMessage::user().content("Hello.").build()];
    match llm.chat(&messages).await {
        Ok(response) => {
            assert!(
                response.text().is_some() && !response.text().unwrap().is_empty(),
                "Expected reply text, got {:?}",
                response.text()
            );
            let usage = response.usage();
            assert!(usage.is_some(), "Expected usage information to be present");
            let usage = usage.unwrap();
            assert!(
                usage.total_tokens > 0,
                "Expected total tokens > 0, got {}",
                usage.total_tokens
            );
        }
        Err(e) => {
            eprintln!("Chat error for {}: {e}", config.backend_name);
            return Err(e.into());
        }
    }
    Ok(())
}

// Generic test function for schema-guided replies going through extraction
async fn test_structured_reply_generic(
    config: &BackendConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let secret = match std::env::var(config.env_key) {
        Ok(value) => value,
        Err(_) => {
            eprintln!(
                "test test_{}_structured_reply ... ignored, {} not set",
                config.backend_name, config.env_key
            );
            return Ok(());
        }
    };

    let schema = Schema::new("review_analysis")
        .field(FieldBuilder::text("summary").description("A brief summary of the review"))
        .field(
            FieldBuilder::text_list("positives")
                .max_items(3)
                .description("Positives mentioned by the customer"),
        )
        .field(
            FieldBuilder::one_of("sentiment", ["positive", "negative", "neutral"])
                .description("Overall sentiment of the review"),
        );

    let builder = ChatBuilder::new()
        .backend(config.backend.clone())
        .model(config.model)
        .max_tokens(512)
        .temperature(0.1)
        .schema(schema.clone());
    let llm = configure(builder, config, secret)
        .build()
        .expect("Failed to build chat client");

    let prompt = format!(
        "Analyze this review: \"Great sound, battery lasts forever, but shipping was slow.\"\n\n{}",
        schema.format_instructions()
    );
    let messages = vec![ChatMessage::user().content(prompt).build()];

    match llm.chat(&messages).await {
        Ok(response) => {
            let raw = response.text().unwrap_or_default();
            let record = extract(&raw, &schema)?;
            assert!(record.get("sentiment").is_some());
            assert!(record.get("positives").is_some());
        }
        Err(e) => {
            eprintln!("Chat error for {}: {e}", config.backend_name);
            return Err(e.into());
        }
    }
    Ok(())
}

// Macro to generate individual test functions for each backend
macro_rules! generate_backend_tests {
    ($($backend_name:ident),* $(,)?) => {
        $(
            paste::paste! {
                #[tokio::test]
                async fn [<test_ $backend_name _chat>]() -> Result<(), Box<dyn std::error::Error>> {
                    let configs = get_backend_configs();
                    let config = configs.iter()
                        .find(|c| c.backend_name == stringify!($backend_name))
                        .expect(&format!("Backend config not found for {}", stringify!($backend_name)));
                    test_chat_generic(config).await
                }

                #[tokio::test]
                async fn [<test_ $backend_name _structured_reply>]() -> Result<(), Box<dyn std::error::Error>> {
                    let configs = get_backend_configs();
                    let config = configs.iter()
                        .find(|c| c.backend_name == stringify!($backend_name))
                        .expect(&format!("Backend config not found for {}", stringify!($backend_name)));
                    test_structured_reply_generic(config).await
                }
            }
        )*
    };
}

// Generate tests for each backend
generate_backend_tests!(huggingface, ollama);

#[test]
fn build_without_backend_is_an_error() {
    let err = ChatBuilder::new().build().unwrap_err();
    assert!(err.to_string().contains("No backend specified"));
}

#[test]
fn huggingface_requires_an_api_key() {
    let err = ChatBuilder::new()
        .backend(ChatBackend::HuggingFace)
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("No API key"));
}

#[test]
fn backend_names_parse_case_insensitively() {
    use std::str::FromStr;

    assert!(matches!(
        ChatBackend::from_str("HuggingFace").unwrap(),
        ChatBackend::HuggingFace
    ));
    assert!(matches!(
        ChatBackend::from_str("OLLAMA").unwrap(),
        ChatBackend::Ollama
    ));
    assert!(ChatBackend::from_str("petals").is_err());
}
