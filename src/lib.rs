pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{HtmlDocument, LocalStorage, SiteFetcher};
pub use config::SiteConfig;
pub use core::{
    engine::RenderEngine,
    renderer::{PageRenderer, RenderPlan},
};
pub use utils::error::{RenderError, Result};
