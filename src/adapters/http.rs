use crate::domain::model::FetchResponse;
use crate::domain::ports::Fetcher;
use crate::utils::error::{RenderError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fetches site paths relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base: &str, timeout: Option<Duration>) -> Result<Self> {
        // Treat the base as a directory so relative joins stay beneath it.
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let base = Url::parse(&normalized).map_err(|e| RenderError::InvalidConfigValueError {
            field: "source.base".to_string(),
            value: base.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| RenderError::InvalidConfigValueError {
                field: "path".to_string(),
                value: path.to_string(),
                reason: format!("Cannot resolve against {}: {}", self.base, e),
            })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, path: &str) -> Result<FetchResponse> {
        let url = self.resolve(path)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        tracing::debug!("{} -> HTTP {}", path, status);

        let body = response.text().await?;
        Ok(FetchResponse { status, body })
    }
}
