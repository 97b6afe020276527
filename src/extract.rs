//! Turning raw model replies into validated records.
//!
//! Small instruction-tuned models answer structured prompts with text that
//! is almost, but not quite, JSON: chat-template control markers leak in,
//! the object may or may not be wrapped in a code fence, fields go missing
//! or change shape. [`extract`] runs the full pipeline against a
//! [`Schema`]: strip markers, unwrap fences, decode, validate. It returns a
//! typed [`Record`] or says precisely which stage failed, keeping the raw
//! reply for inspection either way.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ExtractError, FieldIssue};
use crate::schema::{FieldKind, Schema};

/// Control markers emitted by Gemma-style chat templates.
pub const CONTROL_MARKERS: &[&str] = &["<bos>", "<start_of_turn>", "<end_of_turn>"];

/// Removes every control marker from a reply and trims surrounding
/// whitespace.
///
/// Removal runs to a fixed point: stripping a marker can uncover another
/// one, so a single replacement pass is not enough. Cleaning an
/// already-clean reply returns it unchanged.
///
/// ## Example
///
/// ```
/// use chatform::extract::clean_reply;
///
/// assert_eq!(clean_reply("<bos>Hello!<end_of_turn>"), "Hello!");
/// ```
pub fn clean_reply(raw: &str) -> String {
    let mut text = raw.to_string();
    loop {
        let mut changed = false;
        for marker in CONTROL_MARKERS {
            if text.contains(marker) {
                text = text.replace(marker, "");
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    text.trim().to_string()
}

/// Strips a leading ```` ```json ```` or ```` ``` ```` fence marker and a
/// trailing ```` ``` ```` fence marker if present. Either side may be
/// missing; unfenced text passes through untouched.
pub fn unwrap_code_fence(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest.trim_start();
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text
}

/// A value extracted for a single schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A text or one-of field
    Text(String),
    /// A list field
    List(Vec<String>),
}

impl FieldValue {
    /// The text of a [`FieldValue::Text`] value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::List(_) => None,
        }
    }

    /// The entries of a [`FieldValue::List`] value
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::Text(_) => None,
            FieldValue::List(items) => Some(items),
        }
    }
}

/// A validated reply: one value per schema field, in schema order.
///
/// Records are immutable snapshots of a single reply. Serializing one back
/// to JSON and extracting it again with the same schema yields an equal
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    entries: Vec<(String, FieldValue)>,
}

impl Record {
    /// Looks up a field by name
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Iterates over fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields in the record
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True for a record with no fields (an empty schema)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The record as a JSON object value
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.entries {
            let json = match value {
                FieldValue::Text(text) => Value::String(text.clone()),
                FieldValue::List(items) => {
                    Value::Array(items.iter().cloned().map(Value::String).collect())
                }
            };
            map.insert(name.clone(), json);
        }
        Value::Object(map)
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match value {
                FieldValue::Text(text) => write!(f, "{}: {}", name, text)?,
                FieldValue::List(items) => write!(f, "{}: {}", name, items.join(", "))?,
            }
        }
        Ok(())
    }
}

/// Runs the full extraction pipeline on a raw reply: strip control markers,
/// unwrap code fences, decode the JSON object, validate it against
/// `schema`.
///
/// Decode failures and validation failures are reported separately, and the
/// raw reply travels with both. Validation checks every field before
/// reporting, so the error lists all offending fields at once. Keys the
/// schema does not declare are ignored.
///
/// ## Example
///
/// ```
/// use chatform::extract::extract;
/// use chatform::schema::{FieldBuilder, Schema};
///
/// let schema = Schema::new("greeting")
///     .field(FieldBuilder::text("text").description("What to say"));
///
/// let record = extract(r#"<bos>{"text": "hi"}"#, &schema).unwrap();
/// assert_eq!(record.get("text").and_then(|v| v.as_text()), Some("hi"));
/// ```
pub fn extract(raw: &str, schema: &Schema) -> Result<Record, ExtractError> {
    let cleaned = clean_reply(raw);
    let body = unwrap_code_fence(&cleaned);

    if body.is_empty() {
        return Err(ExtractError::Decode {
            raw: raw.to_string(),
            cleaned: body.to_string(),
            detail: "empty reply".to_string(),
        });
    }

    let value: Value = serde_json::from_str(body).map_err(|e| ExtractError::Decode {
        raw: raw.to_string(),
        cleaned: body.to_string(),
        detail: e.to_string(),
    })?;

    let object = value.as_object().ok_or_else(|| ExtractError::Decode {
        raw: raw.to_string(),
        cleaned: body.to_string(),
        detail: format!("expected a JSON object, got {}", json_type_name(&value)),
    })?;

    let mut entries = Vec::with_capacity(schema.fields().len());
    let mut issues = Vec::new();

    for field in schema.fields() {
        match object.get(&field.name) {
            None => issues.push(FieldIssue {
                field: field.name.clone(),
                reason: "missing field".to_string(),
            }),
            Some(value) => match field_value(&field.kind, value) {
                Ok(entry) => entries.push((field.name.clone(), entry)),
                Err(reason) => issues.push(FieldIssue {
                    field: field.name.clone(),
                    reason,
                }),
            },
        }
    }

    if !issues.is_empty() {
        return Err(ExtractError::Validation {
            raw: raw.to_string(),
            issues,
        });
    }

    Ok(Record { entries })
}

fn field_value(kind: &FieldKind, value: &Value) -> Result<FieldValue, String> {
    match kind {
        FieldKind::Text | FieldKind::OneOf { .. } => match value.as_str() {
            Some(text) => Ok(FieldValue::Text(text.to_string())),
            None => Err(format!("expected a string, got {}", json_type_name(value))),
        },
        FieldKind::TextList { .. } => match value.as_array() {
            Some(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(text) => list.push(text.to_string()),
                        None => {
                            return Err(format!(
                                "expected a list of strings, found {} in the list",
                                json_type_name(item)
                            ))
                        }
                    }
                }
                Ok(FieldValue::List(list))
            }
            None => Err(format!(
                "expected a list of strings, got {}",
                json_type_name(value)
            )),
        },
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
