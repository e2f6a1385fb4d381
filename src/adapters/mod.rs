// Adapters layer: concrete implementations of the domain ports.

pub mod html;
pub mod http;
pub mod local;
pub mod storage;

use crate::domain::model::FetchResponse;
use crate::domain::ports::Fetcher;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub use html::HtmlDocument;
pub use http::HttpFetcher;
pub use local::LocalFetcher;
pub use storage::LocalStorage;

/// Fetcher picked from the configured source: http(s) URLs go over the
/// network, anything else is a site directory.
#[derive(Debug, Clone)]
pub enum SiteFetcher {
    Http(HttpFetcher),
    Local(LocalFetcher),
}

impl SiteFetcher {
    pub fn from_source(source: &str, timeout: Option<Duration>) -> Result<Self> {
        if source.starts_with("http://") || source.starts_with("https://") {
            Ok(SiteFetcher::Http(HttpFetcher::new(source, timeout)?))
        } else {
            Ok(SiteFetcher::Local(LocalFetcher::new(source)))
        }
    }
}

#[async_trait]
impl Fetcher for SiteFetcher {
    async fn get(&self, path: &str) -> Result<FetchResponse> {
        match self {
            SiteFetcher::Http(fetcher) => fetcher.get(path).await,
            SiteFetcher::Local(fetcher) => fetcher.get(path).await,
        }
    }
}
