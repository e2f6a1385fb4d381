pub mod toml_config;

pub use toml_config::SiteConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "site-render")]
#[command(about = "Prerender static site pages with their fragments and JSON content")]
pub struct CliConfig {
    /// Page files to render, relative to --pages-dir
    #[arg(long = "page", required = true)]
    pub pages: Vec<String>,

    #[arg(long, default_value = ".")]
    pub pages_dir: String,

    #[arg(long, default_value = "./dist")]
    pub out_dir: String,

    /// Site base URL or directory for fragments and data (overrides the config file)
    #[arg(long)]
    pub source: Option<String>,

    /// Path to a TOML site configuration
    #[arg(short, long)]
    pub config: Option<String>,

    /// Interpolate data without HTML escaping
    #[arg(long)]
    pub raw: bool,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Write the per-page render reports as JSON
    #[arg(long)]
    pub report: Option<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Show the render plan without fetching anything
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the config file, if any, and applies command line overrides.
    pub fn site_config(&self) -> Result<SiteConfig> {
        let mut site = match &self.config {
            Some(path) => SiteConfig::from_file(path)?,
            None => SiteConfig::default(),
        };

        if let Some(source) = &self.source {
            site.source.base = Some(source.clone());
        }
        if let Some(timeout) = self.timeout_seconds {
            site.source.timeout_seconds = Some(timeout);
        }
        if self.raw {
            site.render.escape = Some(false);
        }
        Ok(site)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("pages_dir", &self.pages_dir)?;
        validation::validate_path("out_dir", &self.out_dir)?;
        for page in &self.pages {
            validation::validate_path("page", page)?;
        }
        if let Some(report) = &self.report {
            validation::validate_path("report", report)?;
        }
        Ok(())
    }
}
