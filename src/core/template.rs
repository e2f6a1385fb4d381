use crate::domain::model::{ContentItem, EscapePolicy};
use crate::utils::error::{RenderError, Result};
use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:\|\s*([a-z]+)\s*)?\}\}").unwrap()
});

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field { name: String, raw: bool },
}

/// Markup with `{{field}}` placeholders. `{{field|raw}}` skips escaping for
/// that one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Text form of a field value: strings verbatim, null as empty, everything
/// else as compact JSON.
fn field_text(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl Template {
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER_RE.captures_iter(source) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }

            let raw = match caps.get(2).map(|m| m.as_str()) {
                None => false,
                Some("raw") => true,
                Some(filter) => {
                    return Err(RenderError::TemplateError {
                        message: format!("unknown filter '{}' in {}", filter, whole.as_str()),
                    })
                }
            };
            segments.push(Segment::Field {
                name: caps[1].to_string(),
                raw,
            });
            last = whole.end();
        }

        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }

        let leftover = segments.iter().find_map(|s| match s {
            Segment::Literal(text) if text.contains("{{") => Some(text.clone()),
            _ => None,
        });
        if let Some(text) = leftover {
            return Err(RenderError::TemplateError {
                message: format!("malformed placeholder near '{}'", text.trim()),
            });
        }

        Ok(Self { segments })
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn render(&self, item: &ContentItem, policy: EscapePolicy) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { name, raw } => {
                    let text = field_text(item.get(name));
                    if *raw || policy == EscapePolicy::Raw {
                        out.push_str(&text);
                    } else {
                        out.push_str(&escape_html(&text));
                    }
                }
            }
        }
        out
    }

    /// Renders every item in input order and concatenates the blocks.
    pub fn render_all(&self, items: &[ContentItem], policy: EscapePolicy) -> String {
        items.iter().map(|item| self.render(item, policy)).collect()
    }
}
