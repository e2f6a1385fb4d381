use crate::adapters::HtmlDocument;
use crate::core::renderer::PageRenderer;
use crate::domain::model::RenderReport;
use crate::domain::ports::{Fetcher, Storage};
use crate::utils::error::{RenderError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub page: String,
    pub report: RenderReport,
}

/// Prerenders page files: read from `input`, render, write to `output`
/// under the same relative path. Data is re-fetched for every page.
pub struct RenderEngine<F: Fetcher, S: Storage> {
    renderer: PageRenderer<F>,
    input: S,
    output: S,
}

impl<F: Fetcher, S: Storage> RenderEngine<F, S> {
    pub fn new(renderer: PageRenderer<F>, input: S, output: S) -> Self {
        Self {
            renderer,
            input,
            output,
        }
    }

    pub async fn render_page(&mut self, page: &str) -> Result<PageResult> {
        tracing::info!("Rendering {}", page);

        let bytes = self.input.read_file(page).await?;
        let html = String::from_utf8(bytes).map_err(|e| RenderError::DocumentError {
            selector: page.to_string(),
            reason: format!("page is not UTF-8: {}", e),
        })?;

        let mut document = HtmlDocument::new(html);
        let report = self.renderer.run(&mut document).await;

        self.output
            .write_file(page, document.into_html().as_bytes())
            .await?;

        Ok(PageResult {
            page: page.to_string(),
            report,
        })
    }

    pub async fn run(&mut self, pages: &[String]) -> Result<Vec<PageResult>> {
        let mut results = Vec::with_capacity(pages.len());
        for page in pages {
            results.push(self.render_page(page).await?);
        }

        let failed = results
            .iter()
            .filter(|r| r.report.failures().next().is_some())
            .count();
        tracing::info!("Rendered {} pages ({} with failed steps)", results.len(), failed);
        Ok(results)
    }
}
