// Runs the extractor against canned model replies, no network required.
// Covers fenced, bare, marker-wrapped and malformed output.

use chatform::error::ExtractError;
use chatform::extract::extract;
use chatform::schema::{FieldBuilder, Schema};
use colored::*;

const REPLIES: &[(&str, &str)] = &[
    (
        "a well fenced reply",
        "```json\n{\"summary\": \"Comfortable and loud.\", \"positives\": [\"comfort\", \"volume\"], \"sentiment\": \"positive\"}\n```",
    ),
    (
        "a bare JSON object",
        "{\"summary\": \"Does the job.\", \"positives\": [\"price\"], \"sentiment\": \"neutral\"}",
    ),
    (
        "turn markers and a half-open fence",
        "<start_of_turn>```json\n{\"summary\": \"Broke in a week.\", \"positives\": [], \"sentiment\": \"negative\"}<end_of_turn>",
    ),
    (
        "prose wrapped around the object",
        "Sure! Here is the JSON you asked for:\n{\"summary\": \"Fine.\", \"positives\": [], \"sentiment\": \"neutral\"}",
    ),
    (
        "a missing sentiment field",
        "```json\n{\"summary\": \"Great sound.\", \"positives\": [\"sound\"]}\n```",
    ),
    (
        "a scalar where a list belongs",
        "{\"summary\": \"Meh.\", \"positives\": \"price\", \"sentiment\": \"neutral\"}",
    ),
];

fn review_schema() -> Schema {
    Schema::new("review_analysis")
        .field(FieldBuilder::text("summary"))
        .field(FieldBuilder::text_list("positives").max_items(3))
        .field(FieldBuilder::one_of(
            "sentiment",
            ["positive", "negative", "neutral"],
        ))
}

fn main() {
    let schema = review_schema();
    for (label, raw) in REPLIES {
        println!("{} {}", "Reply with".bold(), label);
        match extract(raw, &schema) {
            Ok(record) => {
                println!("{}", "Extracted:".bright_green());
                println!("{record}");
            }
            Err(ExtractError::Decode { detail, .. }) => {
                println!("{} {}", "Decode error:".bright_red(), detail);
            }
            Err(ExtractError::Validation { issues, .. }) => {
                for issue in issues {
                    println!("{} {}", "Validation error:".bright_red(), issue);
                }
            }
        }
        println!();
    }
}
