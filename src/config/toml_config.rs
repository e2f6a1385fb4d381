use crate::core::nav::NavToggle;
use crate::core::renderer::{LoaderIndicator, RenderPlan};
use crate::core::targets::{builtin_fragments, builtin_targets, FragmentTarget, RenderTarget};
use crate::core::template::Template;
use crate::domain::model::EscapePolicy;
use crate::utils::error::{RenderError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub render: RenderConfig,
    pub nav: Option<NavConfig>,
    /// Replaces the default fragment list when present.
    pub fragments: Option<Vec<FragmentConfig>>,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    pub escape: Option<bool>,
    pub loader: Option<String>,
    pub hidden_class: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavConfig {
    pub enabled: Option<bool>,
    pub toggle: Option<String>,
    pub menu: Option<String>,
    pub active_class: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentConfig {
    pub mount: String,
    pub path: String,
}

/// Overrides a built-in target by name, or declares a new one when the name
/// is unknown (then path, mount and template are all required).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    pub enabled: Option<bool>,
    pub path: Option<String>,
    pub mount: Option<String>,
    pub template: Option<String>,
}

impl TargetConfig {
    fn apply(&self, target: &mut RenderTarget) -> Result<()> {
        if let Some(path) = &self.path {
            target.path = path.clone();
        }
        if let Some(mount) = &self.mount {
            target.mount = validation::validate_selector(&self.field("mount"), mount)?;
        }
        if let Some(template) = &self.template {
            target.template = Template::parse(template)?;
        }
        Ok(())
    }

    fn build(&self) -> Result<RenderTarget> {
        match (&self.path, &self.mount, &self.template) {
            (Some(path), Some(mount), Some(template)) => Ok(RenderTarget {
                name: self.name.clone(),
                path: path.clone(),
                mount: validation::validate_selector(&self.field("mount"), mount)?,
                template: Template::parse(template)?,
            }),
            _ => Err(RenderError::ConfigError {
                message: format!(
                    "target '{}' is not built in; path, mount and template are required",
                    self.name
                ),
            }),
        }
    }

    fn field(&self, name: &str) -> String {
        format!("targets.{}.{}", self.name, name)
    }
}

impl SiteConfig {
    pub const DEFAULT_BASE: &'static str = ".";

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| RenderError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written. The whole file is substituted, templates included,
    /// so a literal `${...}` is written `$${...}`.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$(\$)?\{([^}]+)\}").unwrap());

        ENV_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[2];
                if caps.get(1).is_some() {
                    return format!("${{{}}}", var_name);
                }
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn base(&self) -> &str {
        self.source.base.as_deref().unwrap_or(Self::DEFAULT_BASE)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    pub fn escape_policy(&self) -> EscapePolicy {
        if self.render.escape.unwrap_or(true) {
            EscapePolicy::Escape
        } else {
            EscapePolicy::Raw
        }
    }

    fn loader(&self) -> Result<LoaderIndicator> {
        let mut loader = LoaderIndicator::default();
        if let Some(selector) = &self.render.loader {
            loader.selector = validation::validate_selector("render.loader", selector)?;
        }
        if let Some(class) = &self.render.hidden_class {
            validation::validate_class_name("render.hidden_class", class)?;
            loader.hidden_class = class.clone();
        }
        Ok(loader)
    }

    fn nav(&self) -> Result<Option<NavToggle>> {
        let Some(config) = &self.nav else {
            return Ok(Some(NavToggle::default()));
        };
        if !config.enabled.unwrap_or(true) {
            return Ok(None);
        }

        let mut nav = NavToggle::default();
        if let Some(toggle) = &config.toggle {
            nav.toggle = validation::validate_selector("nav.toggle", toggle)?;
        }
        if let Some(menu) = &config.menu {
            nav.menu = validation::validate_selector("nav.menu", menu)?;
        }
        if let Some(class) = &config.active_class {
            validation::validate_class_name("nav.active_class", class)?;
            nav.active_class = class.clone();
        }
        Ok(Some(nav))
    }

    fn fragments(&self) -> Result<Vec<FragmentTarget>> {
        let Some(fragments) = &self.fragments else {
            return builtin_fragments();
        };

        fragments
            .iter()
            .map(|f| {
                validation::validate_path("fragments.path", &f.path)?;
                Ok(FragmentTarget {
                    mount: validation::validate_selector("fragments.mount", &f.mount)?,
                    path: f.path.clone(),
                })
            })
            .collect()
    }

    fn targets(&self) -> Result<Vec<RenderTarget>> {
        let mut targets = builtin_targets()?;

        for config in &self.targets {
            validation::validate_non_empty_string("targets.name", &config.name)?;
            if let Some(path) = &config.path {
                validation::validate_path(&config.field("path"), path)?;
            }

            match targets.iter().position(|t| t.name == config.name) {
                Some(index) if !config.enabled.unwrap_or(true) => {
                    targets.remove(index);
                }
                Some(index) => config.apply(&mut targets[index])?,
                None if !config.enabled.unwrap_or(true) => {}
                None => targets.push(config.build()?),
            }
        }

        Ok(targets)
    }

    /// Resolves the configuration into the steps a page render runs.
    pub fn to_plan(&self) -> Result<RenderPlan> {
        Ok(RenderPlan {
            loader: self.loader()?,
            fragments: self.fragments()?,
            nav: self.nav()?,
            targets: self.targets()?,
            escape: self.escape_policy(),
        })
    }

    /// Checks the source settings, then resolves the plan. Selector, class
    /// and template errors surface while resolving.
    pub fn validated_plan(&self) -> Result<RenderPlan> {
        validation::validate_source("source.base", self.base())?;

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_positive_number("source.timeout_seconds", timeout, 1)?;
        }

        validation::validate_unique_names("targets", self.targets.iter().map(|t| t.name.as_str()))?;

        self.to_plan()
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.validated_plan().map(|_| ())
    }
}
