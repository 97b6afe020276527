use chatform::{
    error::ExtractError,
    extract::{clean_reply, extract, unwrap_code_fence, FieldValue, CONTROL_MARKERS},
    schema::{FieldBuilder, Schema},
};

fn review_schema() -> Schema {
    Schema::new("review_analysis")
        .field(FieldBuilder::text("summary").description("A brief summary of the customer review"))
        .field(
            FieldBuilder::text_list("positives")
                .max_items(3)
                .description("Positives mentioned by the customer"),
        )
        .field(
            FieldBuilder::one_of("sentiment", ["positive", "negative", "neutral"])
                .description("Overall sentiment of the review"),
        )
}

const BODY: &str = r#"{"summary": "Solid headphones, slow shipping.", "positives": ["sound quality", "battery life"], "sentiment": "positive"}"#;

#[test]
fn fenced_and_unfenced_replies_extract_identically() {
    let schema = review_schema();
    let bare = extract(BODY, &schema).expect("bare JSON should extract");
    let tagged_fence = extract(&format!("```json\n{BODY}\n```"), &schema).unwrap();
    let anonymous_fence = extract(&format!("```\n{BODY}\n```"), &schema).unwrap();
    assert_eq!(bare, tagged_fence);
    assert_eq!(bare, anonymous_fence);
}

#[test]
fn one_sided_fences_still_extract() {
    let schema = review_schema();
    let bare = extract(BODY, &schema).unwrap();
    let opening_only = extract(&format!("```json\n{BODY}"), &schema).unwrap();
    let closing_only = extract(&format!("{BODY}\n```"), &schema).unwrap();
    assert_eq!(bare, opening_only);
    assert_eq!(bare, closing_only);
}

#[test]
fn unwrap_code_fence_leaves_unfenced_text_alone() {
    assert_eq!(unwrap_code_fence("{\"a\": 1}"), "{\"a\": 1}");
    assert_eq!(unwrap_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    assert_eq!(unwrap_code_fence("```\n{\"a\": 1}"), "{\"a\": 1}");
}

#[test]
fn markers_around_the_object_are_stripped() {
    let schema = review_schema();
    let raw = format!("<bos>```json\n{BODY}\n```<end_of_turn>");
    let record = extract(&raw, &schema).unwrap();
    assert_eq!(record, extract(BODY, &schema).unwrap());
}

#[test]
fn cleaning_is_idempotent() {
    let raw = "<bos>hello <start_of_turn>there<end_of_turn> friend";
    let once = clean_reply(raw);
    let twice = clean_reply(&once);
    assert_eq!(once, twice);
    for marker in CONTROL_MARKERS {
        assert!(!once.contains(marker), "marker {marker} survived cleaning");
    }
}

#[test]
fn cleaning_removes_markers_uncovered_by_removal() {
    // Stripping the inner marker re-forms the outer one
    assert_eq!(clean_reply("<bo<bos>s>payload<end_of_turn>"), "payload");
}

#[test]
fn missing_sentiment_is_a_validation_error_naming_it() {
    let schema = review_schema();
    let raw = r#"{"summary": "ok", "positives": ["sound quality"]}"#;
    match extract(raw, &schema) {
        Err(ExtractError::Validation { issues, .. }) => {
            assert!(issues
                .iter()
                .any(|i| i.field == "sentiment" && i.reason.contains("missing")));
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn trailing_prose_is_a_decode_error_preserving_the_raw_reply() {
    let schema = review_schema();
    let raw = format!("{BODY}\nHope this helps!");
    match extract(&raw, &schema) {
        Err(ExtractError::Decode { raw: kept, .. }) => assert_eq!(kept, raw),
        other => panic!("expected a decode error, got {other:?}"),
    }
}

#[test]
fn leading_prose_is_a_decode_error() {
    let schema = review_schema();
    let raw = format!("Here is the JSON you asked for:\n{BODY}");
    assert!(matches!(
        extract(&raw, &schema),
        Err(ExtractError::Decode { .. })
    ));
}

#[test]
fn scalar_where_a_list_is_required_names_the_field() {
    let schema = review_schema();
    let raw = r#"{"summary": "ok", "positives": "sound quality", "sentiment": "positive"}"#;
    match extract(raw, &schema) {
        Err(ExtractError::Validation { issues, .. }) => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].field, "positives");
            assert!(issues[0].reason.contains("list"));
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn non_string_list_element_names_the_field() {
    let schema = review_schema();
    let raw = r#"{"summary": "ok", "positives": ["sound quality", 3], "sentiment": "positive"}"#;
    match extract(raw, &schema) {
        Err(ExtractError::Validation { issues, .. }) => {
            assert_eq!(issues[0].field, "positives");
            assert!(issues[0].reason.contains("number"));
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn every_offending_field_is_reported_at_once() {
    let schema = review_schema();
    let raw = r#"{"summary": 12, "positives": "sound quality"}"#;
    match extract(raw, &schema) {
        Err(ExtractError::Validation { issues, .. }) => {
            let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
            assert_eq!(fields, ["summary", "positives", "sentiment"]);
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn unknown_keys_are_ignored() {
    let schema = review_schema();
    let raw = r#"{"summary": "ok", "positives": [], "sentiment": "neutral", "confidence": 0.9}"#;
    let record = extract(raw, &schema).unwrap();
    assert_eq!(record.len(), 3);
    assert!(record.get("confidence").is_none());
}

#[test]
fn empty_reply_is_a_decode_error() {
    let schema = review_schema();
    for raw in ["", "   ", "<bos>", "```json\n```"] {
        match extract(raw, &schema) {
            Err(ExtractError::Decode { raw: kept, .. }) => assert_eq!(kept, raw),
            other => panic!("expected a decode error for {raw:?}, got {other:?}"),
        }
    }
}

#[test]
fn non_object_top_level_is_a_decode_error() {
    let schema = review_schema();
    match extract(r#"["positive", "negative"]"#, &schema) {
        Err(ExtractError::Decode { detail, .. }) => assert!(detail.contains("object")),
        other => panic!("expected a decode error, got {other:?}"),
    }
}

#[test]
fn validation_errors_carry_the_raw_reply() {
    let schema = review_schema();
    let raw = "<bos>{\"summary\": \"ok\", \"positives\": []}";
    match extract(raw, &schema) {
        Err(err @ ExtractError::Validation { .. }) => assert_eq!(err.raw(), raw),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn records_expose_fields_in_schema_order() {
    let schema = review_schema();
    let record = extract(BODY, &schema).unwrap();
    let names: Vec<_> = record.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["summary", "positives", "sentiment"]);
    assert_eq!(
        record.get("summary").and_then(FieldValue::as_text),
        Some("Solid headphones, slow shipping.")
    );
    assert_eq!(
        record
            .get("positives")
            .and_then(FieldValue::as_list)
            .map(<[String]>::len),
        Some(2)
    );
}

#[test]
fn records_round_trip_through_json() {
    let schema = review_schema();
    let record = extract(BODY, &schema).unwrap();

    let serialized = serde_json::to_string(&record).unwrap();
    let again = extract(&serialized, &schema).unwrap();
    assert_eq!(record, again);

    let via_value = record.to_value().to_string();
    let once_more = extract(&via_value, &schema).unwrap();
    assert_eq!(record, once_more);
}

#[test]
fn extraction_is_idempotent_on_its_own_output() {
    let schema = review_schema();
    let raw = format!("<start_of_turn>```json\n{BODY}\n```<end_of_turn>");
    let first = extract(&raw, &schema).unwrap();
    let second = extract(&first.to_value().to_string(), &schema).unwrap();
    assert_eq!(first, second);
}

#[test]
fn display_renders_one_line_per_field() {
    let schema = review_schema();
    let record = extract(BODY, &schema).unwrap();
    let shown = record.to_string();
    assert!(shown.contains("summary: Solid headphones, slow shipping."));
    assert!(shown.contains("positives: sound quality, battery life"));
    assert_eq!(shown.lines().count(), 3);
}
