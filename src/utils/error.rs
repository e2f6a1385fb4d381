use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error in {path}: {source}")]
    ParseError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to load {path}: HTTP {status}")]
    StatusError { path: String, status: u16 },

    #[error("Expected a JSON array in {path}, found {found}")]
    NotAnArrayError { path: String, found: String },

    #[error("Mount point not found: {selector}")]
    MissingMountError { selector: String },

    #[error("Cannot edit {selector}: {reason}")]
    DocumentError { selector: String, reason: String },

    #[error("Invalid selector '{selector}': {reason}")]
    SelectorError { selector: String, reason: String },

    #[error("Invalid template: {message}")]
    TemplateError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// Coarse failure taxonomy used in step outcomes and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Network,
    Status,
    Parse,
    MissingMount,
    Document,
    Config,
}

impl RenderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RenderError::HttpError(_) | RenderError::IoError(_) => ErrorCategory::Network,
            RenderError::StatusError { .. } => ErrorCategory::Status,
            RenderError::ParseError { .. } | RenderError::NotAnArrayError { .. } => {
                ErrorCategory::Parse
            }
            RenderError::MissingMountError { .. } => ErrorCategory::MissingMount,
            RenderError::DocumentError { .. } => ErrorCategory::Document,
            RenderError::SelectorError { .. }
            | RenderError::TemplateError { .. }
            | RenderError::ConfigError { .. }
            | RenderError::InvalidConfigValueError { .. } => ErrorCategory::Config,
        }
    }

    pub fn is_config_error(&self) -> bool {
        self.category() == ErrorCategory::Config
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RenderError::HttpError(e) if e.is_timeout() => {
                "The site did not answer in time. Try a larger --timeout-seconds.".to_string()
            }
            RenderError::HttpError(_) => {
                "Could not reach the site. Check --source and your network.".to_string()
            }
            RenderError::IoError(e) => format!("File system error: {}", e),
            RenderError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
