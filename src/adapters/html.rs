use crate::domain::model::{Selector, ToggleBinding};
use crate::domain::ports::Document;
use crate::utils::error::{RenderError, Result};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

// Comments, or an opening/closing tag whose attribute text may contain quoted '>'.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .unwrap()
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

#[derive(Debug, Clone)]
struct Tag {
    span: Range<usize>,
    raw_name: String,
    name: String,
    closing: bool,
    attrs: Range<usize>,
    /// Void element; a trailing `/` is kept when the page wrote one.
    void: bool,
    self_closing: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Attr {
    name: String,
    value: Option<String>,
}

#[derive(Debug)]
enum Content {
    Void,
    Inner(Range<usize>),
    Unclosed,
}

#[derive(Debug)]
struct Element {
    open: Tag,
    content: Content,
}

fn find_ascii_ci(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    haystack[from..]
        .to_ascii_lowercase()
        .find(needle)
        .map(|offset| from + offset)
}

fn tokenize(html: &str) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut pos = 0;

    while let Some(caps) = TAG_RE.captures_at(html, pos) {
        let Some(whole) = caps.get(0) else { break };
        pos = whole.end();

        // Comments carry no name group.
        let Some(name) = caps.get(2) else { continue };

        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let attrs = caps.get(3).map_or(whole.end()..whole.end(), |m| m.range());
        let lower = name.as_str().to_ascii_lowercase();
        // A trailing solidus only means something on void elements; on any
        // other tag (or at the end of an unquoted value) it is ignored.
        let void = !closing && VOID_ELEMENTS.contains(&lower.as_str());
        let self_closing = void && html[attrs.clone()].trim_end().ends_with('/');

        if !closing && RAW_TEXT_ELEMENTS.contains(&lower.as_str()) {
            pos = find_ascii_ci(html, pos, &format!("</{}", lower)).unwrap_or(html.len());
        }

        tags.push(Tag {
            span: whole.range(),
            raw_name: name.as_str().to_string(),
            name: lower,
            closing,
            attrs,
            void,
            self_closing,
        });
    }

    tags
}

fn parse_attrs(text: &str) -> Vec<Attr> {
    ATTR_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string());
            Some(Attr { name, value })
        })
        .collect()
}

fn attr_value<'a>(attrs: &'a [Attr], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.value.as_deref().unwrap_or(""))
}

fn set_attr(attrs: &mut Vec<Attr>, name: &str, value: &str) {
    match attrs.iter_mut().find(|a| a.name == name) {
        Some(attr) => attr.value = Some(value.to_string()),
        None => attrs.push(Attr {
            name: name.to_string(),
            value: Some(value.to_string()),
        }),
    }
}

fn class_list(attrs: &[Attr]) -> Vec<String> {
    attr_value(attrs, "class")
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

fn matches_selector(attrs: &[Attr], selector: &Selector) -> bool {
    match selector {
        Selector::Id(id) => attr_value(attrs, "id") == Some(id.as_str()),
        Selector::Class(class) => class_list(attrs).iter().any(|c| c == class),
    }
}

fn render_open_tag(tag: &Tag, attrs: &[Attr]) -> String {
    let mut out = format!("<{}", tag.raw_name);
    for attr in attrs {
        out.push(' ');
        out.push_str(&attr.name);
        if let Some(value) = &attr.value {
            out.push_str("=\"");
            out.push_str(&value.replace('"', "&quot;"));
            out.push('"');
        }
    }
    if tag.self_closing {
        out.push_str(" /");
    }
    out.push('>');
    out
}

/// An HTML page held as text. Edits splice the text in place, so everything
/// outside the touched element is preserved byte for byte.
#[derive(Debug, Clone, Default)]
pub struct HtmlDocument {
    html: String,
    bindings: Vec<ToggleBinding>,
}

impl HtmlDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            bindings: Vec::new(),
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }

    pub fn bindings(&self) -> &[ToggleBinding] {
        &self.bindings
    }

    /// Dispatches a click on `selector` to every toggle bound to it.
    /// Returns the number of bindings fired.
    pub fn click(&mut self, selector: &Selector) -> Result<usize> {
        let fired: Vec<ToggleBinding> = self
            .bindings
            .iter()
            .filter(|b| &b.trigger == selector)
            .cloned()
            .collect();

        for binding in &fired {
            self.toggle_class(&binding.target, &binding.class)?;
        }
        Ok(fired.len())
    }

    fn locate(&self, selector: &Selector) -> Option<Element> {
        let tags = tokenize(&self.html);
        let index = tags.iter().position(|t| {
            !t.closing && matches_selector(&parse_attrs(&self.html[t.attrs.clone()]), selector)
        })?;
        let open = tags[index].clone();

        if open.void {
            return Some(Element {
                open,
                content: Content::Void,
            });
        }

        let mut depth = 0usize;
        for tag in &tags[index + 1..] {
            if tag.name != open.name {
                continue;
            }
            if tag.closing {
                if depth == 0 {
                    let content = Content::Inner(open.span.end..tag.span.start);
                    return Some(Element { open, content });
                }
                depth -= 1;
            } else {
                depth += 1;
            }
        }

        Some(Element {
            open,
            content: Content::Unclosed,
        })
    }

    fn edit_attrs<R>(
        &mut self,
        selector: &Selector,
        edit: impl FnOnce(&mut Vec<Attr>) -> R,
    ) -> Option<R> {
        let element = self.locate(selector)?;
        let mut attrs = parse_attrs(&self.html[element.open.attrs.clone()]);
        let result = edit(&mut attrs);
        let rendered = render_open_tag(&element.open, &attrs);
        self.html.replace_range(element.open.span, &rendered);
        Some(result)
    }

    fn edit_classes(
        &mut self,
        selector: &Selector,
        edit: impl FnOnce(&mut Vec<String>) -> bool,
    ) -> Option<bool> {
        self.edit_attrs(selector, |attrs| {
            let mut classes = class_list(attrs);
            let result = edit(&mut classes);
            set_attr(attrs, "class", &classes.join(" "));
            result
        })
    }
}

impl Document for HtmlDocument {
    fn exists(&self, selector: &Selector) -> bool {
        self.locate(selector).is_some()
    }

    fn inner_html(&self, selector: &Selector) -> Option<String> {
        match self.locate(selector)?.content {
            Content::Inner(range) => Some(self.html[range].to_string()),
            Content::Void => Some(String::new()),
            Content::Unclosed => None,
        }
    }

    fn set_inner_html(&mut self, selector: &Selector, html: &str) -> Result<()> {
        let element = self
            .locate(selector)
            .ok_or_else(|| RenderError::MissingMountError {
                selector: selector.to_string(),
            })?;

        match element.content {
            Content::Inner(range) => {
                self.html.replace_range(range, html);
                Ok(())
            }
            Content::Void => Err(RenderError::DocumentError {
                selector: selector.to_string(),
                reason: format!("<{}> cannot have content", element.open.name),
            }),
            Content::Unclosed => Err(RenderError::DocumentError {
                selector: selector.to_string(),
                reason: format!("<{}> has no closing tag", element.open.name),
            }),
        }
    }

    fn has_class(&self, selector: &Selector, class: &str) -> bool {
        self.locate(selector).is_some_and(|element| {
            class_list(&parse_attrs(&self.html[element.open.attrs])).iter().any(|c| c == class)
        })
    }

    fn add_class(&mut self, selector: &Selector, class: &str) -> Result<bool> {
        if self.has_class(selector, class) {
            return Ok(true);
        }
        let added = self.edit_classes(selector, |classes| {
            classes.push(class.to_string());
            true
        });
        Ok(added.unwrap_or(false))
    }

    fn remove_class(&mut self, selector: &Selector, class: &str) -> Result<bool> {
        if !self.exists(selector) {
            return Ok(false);
        }
        if !self.has_class(selector, class) {
            return Ok(true);
        }
        let removed = self.edit_classes(selector, |classes| {
            classes.retain(|c| c != class);
            true
        });
        Ok(removed.unwrap_or(false))
    }

    fn toggle_class(&mut self, selector: &Selector, class: &str) -> Result<bool> {
        self.edit_classes(selector, |classes| {
            if let Some(index) = classes.iter().position(|c| c == class) {
                classes.remove(index);
                false
            } else {
                classes.push(class.to_string());
                true
            }
        })
        .ok_or_else(|| RenderError::MissingMountError {
            selector: selector.to_string(),
        })
    }

    fn set_attribute(&mut self, selector: &Selector, name: &str, value: &str) -> Result<()> {
        self.edit_attrs(selector, |attrs| set_attr(attrs, &name.to_ascii_lowercase(), value))
            .ok_or_else(|| RenderError::MissingMountError {
                selector: selector.to_string(),
            })
    }

    fn bind_toggle(&mut self, binding: ToggleBinding) -> Result<()> {
        self.set_attribute(&binding.trigger, "data-toggle-target", &binding.target.to_string())?;
        self.set_attribute(&binding.trigger, "data-toggle-class", &binding.class)?;
        if !self.bindings.contains(&binding) {
            self.bindings.push(binding);
        }
        Ok(())
    }
}
