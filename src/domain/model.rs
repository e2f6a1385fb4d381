use crate::utils::error::{ErrorCategory, RenderError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// One record of a JSON content array. Fields are looked up by name at
/// template time; there is no fixed schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub data: HashMap<String, serde_json::Value>,
}

impl ContentItem {
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.data.get(field)
    }
}

/// A mount point reference: `#id` or `.class`. A bare name is an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Selector {
    Id(String),
    Class(String),
}

impl Selector {
    pub fn id(name: &str) -> Self {
        Selector::Id(name.to_string())
    }

    pub fn class(name: &str) -> Self {
        Selector::Class(name.to_string())
    }
}

/// A single CSS identifier, as used for ids and class names.
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '-' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl FromStr for Selector {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (make, name): (fn(String) -> Selector, &str) = match s.strip_prefix('#') {
            Some(rest) => (Selector::Id, rest),
            None => match s.strip_prefix('.') {
                Some(rest) => (Selector::Class, rest),
                None => (Selector::Id, s),
            },
        };

        if !is_valid_name(name) {
            return Err(RenderError::SelectorError {
                selector: s.to_string(),
                reason: "expected a single #id or .class".to_string(),
            });
        }
        Ok(make(name.to_string()))
    }
}

impl TryFrom<String> for Selector {
    type Error = RenderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Selector> for String {
    fn from(value: Selector) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(name) => write!(f, "#{}", name),
            Selector::Class(name) => write!(f, ".{}", name),
        }
    }
}

/// Raw HTTP-ish response as seen by the renderer.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// How interpolated field values are written into markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapePolicy {
    #[default]
    Escape,
    Raw,
}

/// Click binding from a trigger element to a class flip on a target element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleBinding {
    pub trigger: Selector,
    pub target: Selector,
    pub class: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MountAbsent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    /// A fragment was written into its mount.
    Loaded { bytes: usize },
    /// A content list was written into its mount.
    Rendered { items: usize },
    /// A click toggle was bound.
    Wired,
    Skipped { reason: SkipReason },
    Failed {
        category: ErrorCategory,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub step: String,
    #[serde(flatten)]
    pub status: StepStatus,
}

impl StepOutcome {
    pub fn new(step: impl Into<String>, status: StepStatus) -> Self {
        Self {
            step: step.into(),
            status,
        }
    }

    pub fn failed(step: impl Into<String>, error: &RenderError) -> Self {
        Self::new(
            step,
            StepStatus::Failed {
                category: error.category(),
                message: error.to_string(),
            },
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, StepStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOutcome {
    Success,
    PartiallyFailed,
}

/// Per-page load state. A run always starts and ends in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Finished(PageOutcome),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderReport {
    pub outcome: PageOutcome,
    pub steps: Vec<StepOutcome>,
}

impl RenderReport {
    pub fn from_steps(steps: Vec<StepOutcome>) -> Self {
        let outcome = if steps.iter().any(StepOutcome::is_failure) {
            PageOutcome::PartiallyFailed
        } else {
            PageOutcome::Success
        };
        Self { outcome, steps }
    }

    pub fn step(&self, name: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step == name)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|s| s.is_failure())
    }

    pub fn rendered_items(&self) -> usize {
        self.steps
            .iter()
            .map(|s| match s.status {
                StepStatus::Rendered { items } => items,
                _ => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_parsing() {
        assert_eq!("#nav-container".parse::<Selector>().unwrap(), Selector::id("nav-container"));
        assert_eq!(".grid".parse::<Selector>().unwrap(), Selector::class("grid"));
        assert_eq!("footer-container".parse::<Selector>().unwrap(), Selector::id("footer-container"));
        assert!("".parse::<Selector>().is_err());
        assert!(".a .b".parse::<Selector>().is_err());
        assert!("div>p".parse::<Selector>().is_err());
        assert!("#1abc".parse::<Selector>().is_err());
    }

    #[test]
    fn test_selector_display_round_trips_through_serde() {
        let selector: Selector = serde_json::from_str("\".roadmap-timeline\"").unwrap();
        assert_eq!(selector, Selector::class("roadmap-timeline"));
        assert_eq!(serde_json::to_string(&selector).unwrap(), "\".roadmap-timeline\"");
    }

    #[test]
    fn test_fetch_response_success_range() {
        assert!(FetchResponse::ok("x").is_success());
        assert!(FetchResponse::status(204).is_success());
        assert!(!FetchResponse::status(304).is_success());
        assert!(!FetchResponse::status(404).is_success());
    }

    #[test]
    fn test_report_outcome_from_steps() {
        let ok = RenderReport::from_steps(vec![
            StepOutcome::new("featured", StepStatus::Rendered { items: 2 }),
            StepOutcome::new(
                "faq",
                StepStatus::Skipped {
                    reason: SkipReason::MountAbsent,
                },
            ),
        ]);
        assert_eq!(ok.outcome, PageOutcome::Success);
        assert_eq!(ok.rendered_items(), 2);

        let err = RenderError::StatusError {
            path: "data/roadmap.json".to_string(),
            status: 404,
        };
        let partial = RenderReport::from_steps(vec![StepOutcome::failed("roadmap", &err)]);
        assert_eq!(partial.outcome, PageOutcome::PartiallyFailed);
        assert_eq!(partial.failures().count(), 1);
    }

    #[test]
    fn test_step_outcome_serializes_flat() {
        let step = StepOutcome::new("faq", StepStatus::Rendered { items: 3 });
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json, serde_json::json!({"step": "faq", "status": "rendered", "items": 3}));
    }
}
