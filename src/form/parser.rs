//! Separates the narrative text of a reply from an embedded form payload.
//!
//! Detection is by content pattern, so the payload may be bare JSON or sit
//! inside a fenced code block. Malformed payloads never surface as errors;
//! the reply is then shown as plain narrative.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{FormDescriptor, FormError};

/// From the first `{` that has a form marker after it, to the last `}`.
static GREEDY_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{[\s\S]*"type":\s*"form"[\s\S]*\}"#).expect("Invalid form regex")
});

static FORM_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""type":\s*"form""#).expect("Invalid form marker regex"));

/// How the payload span is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanRule {
    /// Runs to the last `}` in the reply. Swallows any unrelated JSON that
    /// follows the form, which then fails to parse.
    #[default]
    Greedy,
    /// Runs to the brace that actually closes the opening `{`.
    Balanced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReply {
    pub narrative_text: String,
    pub embedded_form: Option<FormDescriptor>,
}

impl GeneratedReply {
    fn narrative_only(raw: &str) -> Self {
        Self { narrative_text: raw.to_string(), embedded_form: None }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FormExtractor {
    rule: SpanRule,
}

/// Extracts with the default [`SpanRule::Greedy`] rule.
pub fn extract(raw_reply: &str) -> GeneratedReply {
    FormExtractor::default().extract(raw_reply)
}

impl FormExtractor {
    pub fn new(rule: SpanRule) -> Self {
        Self { rule }
    }

    pub fn extract(&self, raw_reply: &str) -> GeneratedReply {
        let content = raw_reply.trim();
        let span = match self.rule {
            SpanRule::Greedy => greedy_span(content),
            SpanRule::Balanced => balanced_span(content),
        };
        let Some(span) = span else {
            return GeneratedReply::narrative_only(raw_reply);
        };

        match parse_descriptor(&content[span.clone()]) {
            Ok(form) => GeneratedReply {
                narrative_text: content[..span.start].trim().to_string(),
                embedded_form: Some(form),
            },
            Err(e) => {
                debug!("Embedded form ignored: {e}");
                GeneratedReply::narrative_only(raw_reply)
            }
        }
    }
}

fn parse_descriptor(payload: &str) -> Result<FormDescriptor, FormError> {
    let form: FormDescriptor =
        serde_json::from_str(payload).map_err(|e| FormError::Malformed(e.to_string()))?;
    form.validate()?;
    Ok(form)
}

fn greedy_span(content: &str) -> Option<Range<usize>> {
    GREEDY_FORM.find(content).map(|m| m.range())
}

/// First `{` whose balanced object contains the form marker.
fn balanced_span(content: &str) -> Option<Range<usize>> {
    let last_marker = FORM_MARKER.find_iter(content).last()?.start();
    content
        .char_indices()
        .filter(|&(i, c)| c == '{' && i < last_marker)
        .filter_map(|(start, _)| matching_brace(content, start).map(|end| start..end + 1))
        .find(|span| FORM_MARKER.is_match(&content[span.clone()]))
}

/// Byte index of the `}` closing the `{` at `start`, skipping braces inside
/// JSON strings. `None` when the text ends first.
fn matching_brace(content: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in content.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}
