use crate::domain::model::FetchResponse;
use crate::domain::ports::Fetcher;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Serves site paths from a directory the way a static file server would:
/// missing files answer 404 and paths escaping the root answer 403.
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    root: PathBuf,
}

impl LocalFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = path.split(['?', '#']).next().unwrap_or_default();
        let relative = Path::new(relative.trim_start_matches('/'));

        let mut full = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => full.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(full)
    }
}

#[async_trait]
impl Fetcher for LocalFetcher {
    async fn get(&self, path: &str) -> Result<FetchResponse> {
        let Some(full_path) = self.resolve(path) else {
            tracing::debug!("{} escapes the site root", path);
            return Ok(FetchResponse::status(403));
        };
        tracing::debug!("Reading {}", full_path.display());

        match tokio::fs::read_to_string(&full_path).await {
            Ok(body) => Ok(FetchResponse::ok(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse::status(404)),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(dir.path().join("data/faq.json"), r#"[{"question":"Q"}]"#).unwrap();
        dir
    }

    #[test]
    fn test_reads_files_under_root() {
        let dir = site();
        let fetcher = LocalFetcher::new(dir.path());

        let response = tokio_test::block_on(fetcher.get("data/faq.json")).unwrap();
        assert!(response.is_success());
        assert_eq!(response.body, r#"[{"question":"Q"}]"#);

        let with_query = tokio_test::block_on(fetcher.get("/data/faq.json?v=2")).unwrap();
        assert!(with_query.is_success());
    }

    #[test]
    fn test_missing_file_is_404() {
        let dir = site();
        let fetcher = LocalFetcher::new(dir.path());
        let response = tokio_test::block_on(fetcher.get("data/roadmap.json")).unwrap();
        assert_eq!(response.status, 404);
    }

    #[test]
    fn test_parent_components_are_refused() {
        let dir = site();
        let fetcher = LocalFetcher::new(dir.path().join("data"));
        let response = tokio_test::block_on(fetcher.get("../data/faq.json")).unwrap();
        assert_eq!(response.status, 403);
    }
}
