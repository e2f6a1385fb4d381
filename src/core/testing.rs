use crate::domain::model::FetchResponse;
use crate::domain::ports::Fetcher;
use crate::utils::error::{RenderError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;

/// In-memory site. Unregistered paths fail like an unreachable host.
#[derive(Clone, Default)]
pub struct MockFetcher {
    responses: HashMap<String, FetchResponse>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, path: &str, body: &str) -> Self {
        self.responses.insert(path.to_string(), FetchResponse::ok(body));
        self
    }

    pub fn with_status(mut self, path: &str, status: u16) -> Self {
        self.responses.insert(path.to_string(), FetchResponse::status(status));
        self
    }

    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    pub async fn was_requested(&self, path: &str) -> bool {
        self.requests.lock().await.iter().any(|p| p == path)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get(&self, path: &str) -> Result<FetchResponse> {
        self.requests.lock().await.push(path.to_string());
        self.responses.get(path).cloned().ok_or_else(|| {
            RenderError::IoError(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("no route to {}", path),
            ))
        })
    }
}

/// Log sink for a `tracing_subscriber::fmt` subscriber installed for the
/// duration of a test.
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<std::sync::Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Installs a plain-text subscriber writing here on the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer).lines().map(str::to_string).collect()
    }

    pub fn errors_mentioning(&self, needle: &str) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.trim_start().starts_with("ERROR") && line.contains(needle))
            .count()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
