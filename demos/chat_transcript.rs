// Multi-turn exchange kept in a sliding window transcript, against a local
// Ollama server
use chatform::{
    builder::{ChatBackend, ChatBuilder},
    chat::{ChatMessage, ChatRole},
    extract::clean_reply,
    memory::SlidingWindowMemory,
};

#[tokio::main]
async fn main() {
    let base_url = std::env::var("OLLAMA_URL").unwrap_or("http://localhost:11434".into());

    let llm = ChatBuilder::new()
        .backend(ChatBackend::Ollama)
        .base_url(base_url)
        .model("gemma2:2b")
        .max_tokens(256)
        .temperature(0.7)
        .build()
        .expect("Failed to build chat client");

    // Keep the last 10 messages; older turns fall out of the window
    let mut memory = SlidingWindowMemory::new(10);

    let questions = [
        "What is the capital of Senegal?",
        "Roughly how many people live in that city?",
    ];

    for question in questions {
        memory.remember(&ChatMessage::user().content(question).build());

        // The whole transcript goes out on every turn
        let transcript = memory.messages();
        match llm.chat(&transcript).await {
            Ok(reply) => {
                let text = clean_reply(&reply.text().unwrap_or_default());
                memory.remember(&ChatMessage::assistant().content(text).build());
            }
            Err(e) => {
                eprintln!("Chat error: {e}");
                return;
            }
        }
    }

    for message in memory.messages() {
        let label = match message.role {
            ChatRole::User => "user",
            ChatRole::Assistant => "model",
        };
        println!("{label}: {}\n", message.content);
    }
}
