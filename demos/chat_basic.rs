// One-shot chat against a hosted model
use chatform::{
    builder::{ChatBackend, ChatBuilder},
    chat::ChatMessage,
};

#[tokio::main]
async fn main() {
    // Get API key from environment variable or use test key as fallback
    let api_key = std::env::var("HF_TOKEN").unwrap_or("hf-TESTKEY".into());

    // Initialize and configure the chat client
    let llm = ChatBuilder::new()
        .backend(ChatBackend::HuggingFace) // Use the hosted router as the backend
        .api_key(api_key) // Set the API key
        .model("google/gemma-2-2b-it") // Small instruction-tuned model
        .max_tokens(256) // Limit reply length
        .temperature(0.7) // Control randomness (0.0-1.0)
        .build()
        .expect("Failed to build chat client");

    // Prepare the conversation: a single user question
    let messages = vec![ChatMessage::user()
        .content("Which country won the first Cricket World Cup?")
        .build()];

    // Send chat request and handle the reply
    match llm.chat(&messages).await {
        Ok(reply) => println!("Model reply:\n{}", reply.text().unwrap_or_default()),
        Err(e) => eprintln!("Chat error: {e}"),
    }
}
