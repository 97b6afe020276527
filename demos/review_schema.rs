// Review analysis end to end: a field schema drives the prompt format
// instructions, the wire schema and the validation of the reply
use chatform::{
    builder::{ChatBackend, ChatBuilder},
    chat::ChatMessage,
    extract::extract,
    prompt::PromptTemplate,
    schema::{FieldBuilder, Schema},
    secret_store::SecretStore,
};

const REVIEW: &str = "I ordered the wireless headphones last Monday and they arrived \
two days late. The sound quality is honestly excellent and the battery lasts forever, \
but the left ear cushion started peeling after a week. Support never answered my email. \
For this price I expected better.";

const TEMPLATE: &str = "\
Analyze the following product review:

{review}

{format_instructions}";

fn review_schema() -> Schema {
    Schema::new("review_analysis")
        .field(
            FieldBuilder::text("summary")
                .description("A brief summary of the customer review, three lines at most"),
        )
        .field(
            FieldBuilder::text_list("positives")
                .max_items(3)
                .description("Positives mentioned by the customer"),
        )
        .field(
            FieldBuilder::text_list("negatives")
                .max_items(3)
                .description("Negatives mentioned by the customer"),
        )
        .field(
            FieldBuilder::one_of("sentiment", ["positive", "negative", "neutral"])
                .description("Overall sentiment of the review"),
        )
        .field(
            FieldBuilder::text_list("emotions")
                .max_items(5)
                .description("Three to five emotions expressed by the customer"),
        )
        .field(FieldBuilder::text("email").description(
            "A short reply email to the customer, apologetic if the sentiment is negative, \
             thankful otherwise",
        ))
}

// The token comes from the environment, then the secret store, then a
// placeholder that will be rejected by the router
fn hf_token() -> String {
    if let Ok(token) = std::env::var("HF_TOKEN") {
        return token;
    }
    SecretStore::new()
        .ok()
        .and_then(|store| store.get("HF_TOKEN").map(str::to_string))
        .unwrap_or_else(|| "hf-TESTKEY".into())
}

#[tokio::main]
async fn main() {
    chatform::init_logging();

    let api_key = hf_token();

    let schema = review_schema();

    // The schema renders its own format instructions; bind them once
    let prompt =
        PromptTemplate::new(TEMPLATE).partial("format_instructions", schema.format_instructions());

    let llm = ChatBuilder::new()
        .backend(ChatBackend::HuggingFace)
        .api_key(api_key)
        .model("google/gemma-2-2b-it")
        .max_tokens(512)
        .temperature(0.1) // Low temperature keeps the JSON on rails
        .repetition_penalty(1.1)
        .schema(schema.clone()) // Backends with structured output enforce it server-side too
        .build()
        .expect("Failed to build chat client");

    let rendered = prompt
        .render(&[("review", REVIEW)])
        .expect("Failed to render prompt");

    let messages = vec![ChatMessage::user().content(rendered).build()];

    match llm.chat(&messages).await {
        Ok(reply) => {
            let raw = reply.text().unwrap_or_default();
            // Validation happens locally either way
            match extract(&raw, &schema) {
                Ok(record) => println!("{record}"),
                Err(e) => eprintln!("{e}"),
            }
        }
        Err(e) => eprintln!("Chat error: {e}"),
    }
}
