// Chat with reply cleanup: chat-template control markers never reach the user
use chatform::{
    builder::{ChatBackend, ChatBuilder},
    chat::ChatMessage,
    extract::clean_reply,
};

#[tokio::main]
async fn main() {
    chatform::init_logging();

    let api_key = std::env::var("HF_TOKEN").unwrap_or("hf-TESTKEY".into());

    // Prompt comes from the command line, with a default for quick runs
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Write two sentences about lighthouses.".to_string());

    let llm = ChatBuilder::new()
        .backend(ChatBackend::HuggingFace)
        .api_key(api_key)
        .model("google/gemma-2-2b-it")
        .max_tokens(256)
        .temperature(0.8)
        .build()
        .expect("Failed to build chat client");

    let messages = vec![ChatMessage::user().content(prompt).build()];

    match llm.chat(&messages).await {
        Ok(reply) => {
            let raw = reply.text().unwrap_or_default();
            // Small models leak markers like <bos> and <end_of_turn> into
            // their output; strip them before showing the text
            println!("{}", clean_reply(&raw));
        }
        Err(e) => eprintln!("Chat error: {e}"),
    }
}
