pub mod engine;
pub mod loader;
pub mod nav;
pub mod renderer;
pub mod targets;
pub mod template;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{ContentItem, RenderReport, Selector, StepOutcome};
pub use crate::domain::ports::{Document, Fetcher, Storage};
pub use crate::utils::error::Result;
