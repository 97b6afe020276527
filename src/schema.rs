//! Field schemas for structured replies.
//!
//! A schema is an explicit list of the fields a reply must carry: each field
//! has a name, a shape and a prose description. The same schema drives three
//! things: the format instructions embedded in prompts, the wire schema sent
//! to backends with native structured output, and the validation that
//! [`extract`](crate::extract::extract) runs on whatever comes back.

use serde_json::{json, Map, Value};

/// The shape a schema field must decode to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Short free text; must decode to a JSON string
    Text,
    /// A list of short text entries; must decode to a JSON array of strings.
    /// `max_items` only shapes the prompt instructions and is not enforced
    /// at validation time.
    TextList { max_items: Option<usize> },
    /// Free text steered toward one of the listed options. The options feed
    /// the prompt and the wire schema; validation accepts any string.
    OneOf { options: Vec<String> },
}

/// A named field in a reply schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key the reply object must carry
    pub name: String,
    /// Shape the value must decode to
    pub kind: FieldKind,
    /// Prompt-facing description; never consulted during validation
    pub description: String,
}

/// Builder for schema fields
pub struct FieldBuilder {
    name: String,
    kind: FieldKind,
    description: String,
}

impl FieldBuilder {
    /// Creates a free-text field
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            description: String::new(),
        }
    }

    /// Creates a list-of-text field
    pub fn text_list(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::TextList { max_items: None },
            description: String::new(),
        }
    }

    /// Creates a field steered toward one of the given options
    pub fn one_of(
        name: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::OneOf {
                options: options.into_iter().map(Into::into).collect(),
            },
            description: String::new(),
        }
    }

    /// Sets the field description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Sets the advisory item cap for a list field. Has no effect on other
    /// field kinds.
    pub fn max_items(mut self, max_items: usize) -> Self {
        if let FieldKind::TextList { max_items: slot } = &mut self.kind {
            *slot = Some(max_items);
        }
        self
    }

    fn build(self) -> FieldSpec {
        FieldSpec {
            name: self.name,
            kind: self.kind,
            description: self.description,
        }
    }
}

/// An ordered list of fields a reply object must carry.
///
/// ## Example
///
/// ```
/// use chatform::schema::{FieldBuilder, Schema};
///
/// let schema = Schema::new("review_analysis")
///     .field(FieldBuilder::text("summary").description("A brief summary of the review"))
///     .field(FieldBuilder::one_of("sentiment", ["positive", "negative", "neutral"])
///         .description("Overall sentiment of the review"));
///
/// assert_eq!(schema.fields().len(), 2);
/// assert!(schema.format_instructions().contains("one of: positive, negative, neutral"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Creates an empty schema with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field to the schema
    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field.build());
        self
    }

    /// Name of the schema, used as the wire schema name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared fields, in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Renders the schema as prompt instructions: a fenced JSON skeleton
    /// whose values are the per-field descriptions, with option lists and
    /// item caps folded in as hints.
    pub fn format_instructions(&self) -> String {
        let mut lines = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let hint = match &field.kind {
                FieldKind::Text => field.description.clone(),
                FieldKind::TextList { max_items } => match max_items {
                    Some(n) => format!("{} (at most {} items)", field.description, n),
                    None => field.description.clone(),
                },
                FieldKind::OneOf { options } => {
                    format!("{} (one of: {})", field.description, options.join(", "))
                }
            };
            let value = match &field.kind {
                FieldKind::TextList { .. } => format!("[{}]", Value::String(hint)),
                _ => Value::String(hint).to_string(),
            };
            lines.push(format!("    {}: {}", Value::String(field.name.clone()), value));
        }
        format!(
            "Reply with a single JSON object matching this format exactly, \
             with no text before or after it:\n\n```json\n{{\n{}\n}}\n```",
            lines.join(",\n")
        )
    }

    /// Renders the schema as a JSON Schema value for backends with native
    /// structured output. Every field is required; option lists become
    /// `enum` entries; item caps stay out of the wire schema.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let property = match &field.kind {
                FieldKind::Text => json!({
                    "type": "string",
                    "description": field.description,
                }),
                FieldKind::TextList { .. } => json!({
                    "type": "array",
                    "items": { "type": "string" },
                    "description": field.description,
                }),
                FieldKind::OneOf { options } => json!({
                    "type": "string",
                    "enum": options,
                    "description": field.description,
                }),
            };
            properties.insert(field.name.clone(), property);
            required.push(Value::String(field.name.clone()));
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::new("review_analysis")
            .field(FieldBuilder::text("summary").description("A brief summary of the review"))
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

    #[test]
    fn instructions_carry_hints_in_declaration_order() {
        let instructions = sample().format_instructions();
        assert!(instructions.contains("```json"));
        assert!(instructions.contains("(at most 3 items)"));
        assert!(instructions.contains("(one of: positive, negative, neutral)"));
        let summary = instructions.find("\"summary\"").unwrap();
        let positives = instructions.find("\"positives\"").unwrap();
        let sentiment = instructions.find("\"sentiment\"").unwrap();
        assert!(summary < positives && positives < sentiment);
    }

    #[test]
    fn instruction_skeleton_is_itself_valid_json() {
        let instructions = sample().format_instructions();
        let start = instructions.find('{').unwrap();
        let end = instructions.rfind('}').unwrap();
        let skeleton: Value = serde_json::from_str(&instructions[start..=end]).unwrap();
        assert!(skeleton.is_object());
    }

    #[test]
    fn wire_schema_requires_every_field() {
        let schema = sample().json_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
        assert_eq!(schema["properties"]["positives"]["type"], "array");
        assert_eq!(
            schema["properties"]["sentiment"]["enum"],
            json!(["positive", "negative", "neutral"])
        );
        assert!(schema["properties"]["positives"].get("maxItems").is_none());
    }

    #[test]
    fn max_items_on_a_text_field_is_ignored() {
        let spec = Schema::new("s")
            .field(FieldBuilder::text("summary").max_items(3))
            .fields()[0]
            .clone();
        assert_eq!(spec.kind, FieldKind::Text);
    }
}
