use crate::core::loader::{load_component, load_json};
use crate::core::nav::{wire_nav_toggle, NavToggle};
use crate::core::targets::{builtin_fragments, builtin_targets, FragmentTarget, RenderTarget};
use crate::domain::model::{
    EscapePolicy, LoadState, RenderReport, Selector, SkipReason, StepOutcome, StepStatus,
};
use crate::domain::ports::{Document, Fetcher};
use crate::utils::error::{ErrorCategory, Result};

/// The page's busy overlay, shown while content loads.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderIndicator {
    pub selector: Selector,
    pub hidden_class: String,
}

impl Default for LoaderIndicator {
    fn default() -> Self {
        Self {
            selector: Selector::class("loader-overlay"),
            hidden_class: "hidden".to_string(),
        }
    }
}

impl LoaderIndicator {
    pub fn show<D: Document + ?Sized>(&self, document: &mut D) -> Result<()> {
        document.remove_class(&self.selector, &self.hidden_class)?;
        Ok(())
    }

    pub fn hide<D: Document + ?Sized>(&self, document: &mut D) -> Result<()> {
        document.add_class(&self.selector, &self.hidden_class)?;
        Ok(())
    }
}

/// Everything one page render does, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub loader: LoaderIndicator,
    pub fragments: Vec<FragmentTarget>,
    pub nav: Option<NavToggle>,
    pub targets: Vec<RenderTarget>,
    pub escape: EscapePolicy,
}

impl RenderPlan {
    pub fn standard() -> Result<Self> {
        Ok(Self {
            loader: LoaderIndicator::default(),
            fragments: builtin_fragments()?,
            nav: Some(NavToggle::default()),
            targets: builtin_targets()?,
            escape: EscapePolicy::default(),
        })
    }
}

fn skipped() -> StepStatus {
    StepStatus::Skipped {
        reason: SkipReason::MountAbsent,
    }
}

/// Loads and draws one content block. A missing mount skips the block
/// before anything is fetched.
pub async fn render_target<F, D>(
    fetcher: &F,
    document: &mut D,
    target: &RenderTarget,
    policy: EscapePolicy,
) -> StepOutcome
where
    F: Fetcher + ?Sized,
    D: Document + ?Sized,
{
    if !document.exists(&target.mount) {
        tracing::debug!("Skipping {}: {} not on this page", target.name, target.mount);
        return StepOutcome::new(&target.name, skipped());
    }

    let items = match load_json(fetcher, &target.path).await {
        Ok(items) => items,
        Err(e) => return StepOutcome::failed(&target.name, &e),
    };

    if !document.exists(&target.mount) {
        return StepOutcome::new(&target.name, skipped());
    }

    let markup = target.template.render_all(&items, policy);
    match document.set_inner_html(&target.mount, &markup) {
        Ok(()) => {
            tracing::debug!("Rendered {} {} into {}", items.len(), target.name, target.mount);
            StepOutcome::new(&target.name, StepStatus::Rendered { items: items.len() })
        }
        Err(e) => {
            tracing::error!("Error rendering {}: {}", target.name, e);
            StepOutcome::failed(&target.name, &e)
        }
    }
}

async fn load_fragment<F, D>(fetcher: &F, document: &mut D, fragment: &FragmentTarget) -> StepOutcome
where
    F: Fetcher + ?Sized,
    D: Document + ?Sized,
{
    match load_component(fetcher, document, &fragment.mount, &fragment.path).await {
        Ok(bytes) => StepOutcome::new(&fragment.path, StepStatus::Loaded { bytes }),
        Err(e) if e.category() == ErrorCategory::MissingMount => {
            StepOutcome::new(&fragment.path, skipped())
        }
        Err(e) => StepOutcome::failed(&fragment.path, &e),
    }
}

/// Runs the page-ready sequence against one document. Steps run strictly
/// one after another; a failing step is recorded and the sequence moves on.
pub struct PageRenderer<F: Fetcher> {
    fetcher: F,
    plan: RenderPlan,
    state: LoadState,
}

impl<F: Fetcher> PageRenderer<F> {
    pub fn new(fetcher: F, plan: RenderPlan) -> Self {
        Self {
            fetcher,
            plan,
            state: LoadState::Idle,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn transition(&mut self, next: LoadState) {
        tracing::debug!("Page state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    pub async fn run<D: Document + ?Sized>(&mut self, document: &mut D) -> RenderReport {
        self.transition(LoadState::Loading);
        let mut steps = Vec::new();

        if let Err(e) = self.run_steps(document, &mut steps).await {
            tracing::error!("Error loading page: {}", e);
            steps.push(StepOutcome::failed("page", &e));
        }

        // Cleanup runs whatever happened above.
        if let Err(e) = self.plan.loader.hide(document) {
            tracing::error!("Error hiding loader: {}", e);
            steps.push(StepOutcome::failed("loader", &e));
        }

        let report = RenderReport::from_steps(steps);
        self.transition(LoadState::Finished(report.outcome));
        tracing::info!(
            "Page rendered: {:?}, {} items, {} failed steps",
            report.outcome,
            report.rendered_items(),
            report.failures().count()
        );
        self.transition(LoadState::Idle);
        report
    }

    async fn run_steps<D: Document + ?Sized>(
        &self,
        document: &mut D,
        steps: &mut Vec<StepOutcome>,
    ) -> Result<()> {
        self.plan.loader.show(document)?;

        for fragment in &self.plan.fragments {
            steps.push(load_fragment(&self.fetcher, document, fragment).await);
        }

        if let Some(nav) = &self.plan.nav {
            let status = if wire_nav_toggle(document, nav)? {
                StepStatus::Wired
            } else {
                skipped()
            };
            steps.push(StepOutcome::new("nav", status));
        }

        for target in &self.plan.targets {
            steps.push(render_target(&self.fetcher, document, target, self.plan.escape).await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::HtmlDocument;
    use crate::core::testing::{CapturedLogs, MockFetcher};
    use crate::domain::model::PageOutcome;

    const HOME: &str = r#"<html><body>
<div class="loader-overlay hidden"></div>
<header id="nav-container"></header>
<main>
  <div class="grid"></div>
  <div class="roadmap-timeline"></div>
</main>
<footer id="footer-container"></footer>
</body></html>"#;

    const NAV: &str = r#"<button class="nav-toggle">Menu</button><ul class="nav-links"><li>Home</li></ul>"#;

    fn site() -> MockFetcher {
        MockFetcher::new()
            .with_body("components/nav.html", NAV)
            .with_body("components/footer.html", "<p>footer</p>")
            .with_body(
                "data/featured.json",
                r#"[{"title":"A","url":"u","thumbnail":"t","description":"d"}]"#,
            )
            .with_body(
                "data/roadmap.json",
                r#"[{"position":"left","number":1,"title":"Start","date":"Q1","description":"Kickoff"}]"#,
            )
    }

    #[tokio::test]
    async fn test_full_sequence() {
        let mut doc = HtmlDocument::new(HOME);
        let mut renderer = PageRenderer::new(site(), RenderPlan::standard().unwrap());

        let report = renderer.run(&mut doc).await;

        assert_eq!(report.outcome, PageOutcome::Success);
        assert_eq!(renderer.state(), LoadState::Idle);
        assert_eq!(doc.inner_html(&Selector::id("footer-container")).unwrap(), "<p>footer</p>");
        assert_eq!(report.step("nav").unwrap().status, StepStatus::Wired);
        assert_eq!(report.step("featured").unwrap().status, StepStatus::Rendered { items: 1 });
        assert!(doc.has_class(&Selector::class("loader-overlay"), "hidden"));

        doc.click(&Selector::class("nav-toggle")).unwrap();
        assert!(doc.has_class(&Selector::class("nav-links"), "active"));
    }

    #[tokio::test]
    async fn test_absent_mounts_are_never_fetched() {
        let mut doc = HtmlDocument::new(HOME);
        let fetcher = site();
        let mut renderer = PageRenderer::new(fetcher.clone(), RenderPlan::standard().unwrap());

        let report = renderer.run(&mut doc).await;

        let requests = fetcher.requests().await;
        assert_eq!(
            requests,
            vec![
                "components/nav.html",
                "components/footer.html",
                "data/featured.json",
                "data/roadmap.json"
            ]
        );
        for name in ["announcements", "resources", "faq", "features", "categories"] {
            assert_eq!(report.step(name).unwrap().status, skipped());
        }
    }

    #[tokio::test]
    async fn test_featured_scenario() {
        let mut doc = HtmlDocument::new(r#"<div class="grid"></div>"#);
        let target = builtin_targets().unwrap().remove(0);

        let outcome = render_target(&site(), &mut doc, &target, EscapePolicy::Escape).await;
        assert_eq!(outcome.status, StepStatus::Rendered { items: 1 });

        let grid = doc.inner_html(&Selector::class("grid")).unwrap();
        assert_eq!(grid.matches("featured-card").count(), 1);
        assert!(grid.contains(r#"<a href="u" class="card featured-card" target="_blank">"#));
        assert!(grid.contains(r#"<img src="t" alt="A""#));
        assert!(grid.contains("<h3>A</h3>"));
        assert!(grid.contains("<p>d</p>"));
    }

    #[tokio::test]
    async fn test_mount_with_unquoted_slash_attribute_is_filled() {
        let mut doc = HtmlDocument::new(r#"<main><div class="grid" data-base=/assets/></div></main>"#);
        let target = builtin_targets().unwrap().remove(0);

        let outcome = render_target(&site(), &mut doc, &target, EscapePolicy::Escape).await;
        assert_eq!(outcome.status, StepStatus::Rendered { items: 1 });
        assert!(doc.inner_html(&Selector::class("grid")).unwrap().contains("<h3>A</h3>"));
    }

    #[tokio::test]
    async fn test_grid_absent_skips_featured_fetch() {
        let fetcher = site();
        let mut doc = HtmlDocument::new("<main></main>");
        let target = builtin_targets().unwrap().remove(0);

        let outcome = render_target(&fetcher, &mut doc, &target, EscapePolicy::Escape).await;
        assert_eq!(outcome.status, skipped());
        assert!(!fetcher.was_requested("data/featured.json").await);
    }

    #[tokio::test]
    async fn test_roadmap_404_leaves_mount_empty() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();
        let fetcher = site().with_status("data/roadmap.json", 404);
        let mut doc = HtmlDocument::new(HOME);
        let mut renderer = PageRenderer::new(fetcher, RenderPlan::standard().unwrap());

        let report = renderer.run(&mut doc).await;

        assert_eq!(logs.errors_mentioning("data/roadmap.json"), 1);
        assert_eq!(logs.lines().iter().filter(|l| l.trim_start().starts_with("ERROR")).count(), 1);

        assert_eq!(report.outcome, PageOutcome::PartiallyFailed);
        assert_eq!(doc.inner_html(&Selector::class("roadmap-timeline")).unwrap(), "");
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].step, "roadmap");
        assert!(matches!(
            failures[0].status,
            StepStatus::Failed {
                category: ErrorCategory::Status,
                ..
            }
        ));
        assert!(doc.has_class(&Selector::class("loader-overlay"), "hidden"));
    }

    #[tokio::test]
    async fn test_n_items_render_n_blocks_in_order() {
        let data: Vec<serde_json::Value> = (0..5)
            .map(|i| serde_json::json!({"question": format!("Q{}", i), "answer": "yes"}))
            .collect();
        let fetcher = MockFetcher::new()
            .with_body("data/faq.json", &serde_json::to_string(&data).unwrap());
        let mut doc = HtmlDocument::new(r#"<section class="faq-container">old</section>"#);
        let faq = builtin_targets()
            .unwrap()
            .into_iter()
            .find(|t| t.name == "faq")
            .unwrap();

        render_target(&fetcher, &mut doc, &faq, EscapePolicy::Escape).await;

        let html = doc.inner_html(&Selector::class("faq-container")).unwrap();
        assert_eq!(html.matches("class=\"card faq-item\"").count(), 5);
        let positions: Vec<usize> = (0..5).map(|i| html.find(&format!(">Q{}<", i)).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!html.contains("old"));
    }

    #[tokio::test]
    async fn test_total_failure_still_hides_loader() {
        let mut doc = HtmlDocument::new(HOME);
        let mut renderer = PageRenderer::new(MockFetcher::new(), RenderPlan::standard().unwrap());

        let report = renderer.run(&mut doc).await;

        assert_eq!(report.outcome, PageOutcome::PartiallyFailed);
        assert_eq!(report.failures().count(), 4);
        assert!(doc.has_class(&Selector::class("loader-overlay"), "hidden"));
        assert_eq!(doc.inner_html(&Selector::class("grid")).unwrap(), "");
    }

    #[tokio::test]
    async fn test_document_error_is_contained_to_its_step() {
        let fetcher = site().with_body("data/faq.json", r#"[{"question":"Q"}]"#);
        let mut doc = HtmlDocument::new(
            r#"<div class="loader-overlay"></div><img class="faq-container"><div class="grid"></div>"#,
        );
        let mut renderer = PageRenderer::new(fetcher, RenderPlan::standard().unwrap());

        let report = renderer.run(&mut doc).await;

        assert!(report.step("faq").unwrap().is_failure());
        assert_eq!(report.step("featured").unwrap().status, StepStatus::Rendered { items: 1 });
        assert!(doc.has_class(&Selector::class("loader-overlay"), "hidden"));
    }

    #[tokio::test]
    async fn test_running_twice_is_idempotent() {
        let mut doc = HtmlDocument::new(HOME);
        let mut renderer = PageRenderer::new(site(), RenderPlan::standard().unwrap());

        renderer.run(&mut doc).await;
        let first = doc.html().to_string();
        renderer.run(&mut doc).await;

        assert_eq!(doc.html(), first);
        assert_eq!(doc.html().matches("<p>footer</p>").count(), 1);
    }

    #[tokio::test]
    async fn test_escaping_applies_to_data_not_fragments() {
        let fetcher = site().with_body(
            "data/featured.json",
            r#"[{"title":"<script>x</script>","url":"u","thumbnail":"t","description":"d"}]"#,
        );
        let mut doc = HtmlDocument::new(HOME);
        let mut renderer = PageRenderer::new(fetcher, RenderPlan::standard().unwrap());

        renderer.run(&mut doc).await;

        let grid = doc.inner_html(&Selector::class("grid")).unwrap();
        assert!(grid.contains("<h3>&lt;script&gt;x&lt;/script&gt;</h3>"));
        assert!(doc.html().contains(r#"<ul class="nav-links">"#));
    }
}
