//! Prompt templates with named placeholders.

use crate::error::ChatError;

/// A prompt template with `{name}` placeholders.
///
/// `{{` and `}}` escape literal braces, which keeps inline JSON examples
/// intact. Variables can be pre-bound with [`partial`](Self::partial) (the
/// usual home for schema format instructions) and the rest are supplied at
/// render time. Substitution is a single pass over the template; inserted
/// values are never re-scanned, so braces inside a value stay as they are.
///
/// ## Example
///
/// ```
/// use chatform::prompt::PromptTemplate;
///
/// let prompt = PromptTemplate::new("Analyze this review:\n\n{review}\n\n{format_instructions}")
///     .partial("format_instructions", "Reply with JSON.");
///
/// let rendered = prompt.render(&[("review", "Great battery, slow shipping.")]).unwrap();
/// assert!(rendered.contains("Great battery"));
/// assert!(rendered.ends_with("Reply with JSON."));
/// ```
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    partials: Vec<(String, String)>,
}

impl PromptTemplate {
    /// Creates a template from its text
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            partials: Vec::new(),
        }
    }

    /// Pre-binds a variable that keeps its value across renders. Render-time
    /// values take precedence over partials of the same name.
    pub fn partial(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.partials.push((name.into(), value.into()));
        self
    }

    /// Renders the template, filling `{name}` placeholders from `vars` and
    /// the pre-bound partials.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::InvalidRequest` when a placeholder has no value
    /// or a `{` is never closed.
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<String, ChatError> {
        let mut out = String::with_capacity(self.template.len());
        let mut chars = self.template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => {
                                return Err(ChatError::InvalidRequest(format!(
                                    "unterminated placeholder `{{{}` in prompt template",
                                    name
                                )))
                            }
                        }
                    }
                    let value = vars
                        .iter()
                        .find(|(n, _)| *n == name)
                        .map(|(_, v)| *v)
                        .or_else(|| {
                            self.partials
                                .iter()
                                .find(|(n, _)| *n == name)
                                .map(|(_, v)| v.as_str())
                        });
                    match value {
                        Some(v) => out.push_str(v),
                        None => {
                            return Err(ChatError::InvalidRequest(format!(
                                "missing value for template variable `{}`",
                                name
                            )))
                        }
                    }
                }
                _ => out.push(c),
            }
        }

        Ok(out)
    }
}
