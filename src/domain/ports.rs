use crate::domain::model::{FetchResponse, Selector, ToggleBinding};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where page files are read from and rendered pages are written to.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Source of fragments and data files. `Err` means the request never produced
/// a response; a non-success status is reported through `FetchResponse`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, path: &str) -> Result<FetchResponse>;
}

/// The page's document tree. Lookups follow querySelector semantics: the
/// first matching element in document order.
pub trait Document {
    fn exists(&self, selector: &Selector) -> bool;
    fn inner_html(&self, selector: &Selector) -> Option<String>;
    fn set_inner_html(&mut self, selector: &Selector, html: &str) -> Result<()>;

    fn has_class(&self, selector: &Selector, class: &str) -> bool;
    /// Returns false when the element is absent.
    fn add_class(&mut self, selector: &Selector, class: &str) -> Result<bool>;
    fn remove_class(&mut self, selector: &Selector, class: &str) -> Result<bool>;
    /// Returns whether the class is present afterwards.
    fn toggle_class(&mut self, selector: &Selector, class: &str) -> Result<bool>;

    fn set_attribute(&mut self, selector: &Selector, name: &str, value: &str) -> Result<()>;
    fn bind_toggle(&mut self, binding: ToggleBinding) -> Result<()>;
}
