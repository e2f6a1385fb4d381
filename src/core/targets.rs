use crate::core::template::Template;
use crate::domain::model::Selector;
use crate::utils::error::Result;

/// One JSON-backed content block: where its data lives, where it mounts and
/// how each item is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    pub name: String,
    pub path: String,
    pub mount: Selector,
    pub template: Template,
}

impl RenderTarget {
    pub fn new(name: &str, path: &str, mount: &str, template: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            path: path.to_string(),
            mount: mount.parse()?,
            template: Template::parse(template)?,
        })
    }
}

/// A fragment fetched verbatim into an element.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentTarget {
    pub mount: Selector,
    pub path: String,
}

impl FragmentTarget {
    pub fn new(mount: &str, path: &str) -> Result<Self> {
        Ok(Self {
            mount: mount.parse()?,
            path: path.to_string(),
        })
    }
}

const FEATURED: &str = r#"
        <a href="{{url}}" class="card featured-card" target="_blank">
            <img src="{{thumbnail}}" alt="{{title}}" class="thumbnail" loading="lazy">
            <h3>{{title}}</h3>
            <p>{{description}}</p>
        </a>
    "#;

const ANNOUNCEMENTS: &str = r#"
        <div class="card announcement-card">
            <div class="announcement-date">{{date}}</div>
            <h3>{{title}}</h3>
            <p>{{description}}</p>
            <a href="{{link}}" class="announcement-link">{{linkText}} <i class="fa-solid fa-arrow-right"></i></a>
        </div>
    "#;

const ROADMAP: &str = r#"
        <div class="milestone milestone-{{position}}">
            <div class="card milestone-card">
                <div class="milestone-number">{{number}}</div>
                <h3>{{title}}</h3>
                <div class="milestone-date">{{date}}</div>
                <p>{{description}}</p>
            </div>
            <div class="milestone-dot"></div>
        </div>
    "#;

const RESOURCES: &str = r#"
        <tr>
            <td>{{name}}</td>
            <td>{{notes}}</td>
            <td><a href="{{link}}" target="_blank">Visit <i class="fa-solid fa-arrow-up-right-from-square"></i></a></td>
        </tr>
    "#;

const FAQ: &str = r#"
        <details class="card faq-item">
            <summary class="faq-question">{{question}}</summary>
            <p class="faq-answer">{{answer}}</p>
        </details>
    "#;

const FEATURES: &str = r#"
        <div class="card feature-card">
            <i class="{{icon}} feature-icon"></i>
            <h3>{{title}}</h3>
            <p>{{description}}</p>
        </div>
    "#;

const CATEGORIES: &str = r#"
        <a href="{{url}}" class="card category-card">
            <i class="{{icon}} category-icon"></i>
            <h3>{{name}}</h3>
            <p>{{description}}</p>
        </a>
    "#;

/// The site's standard content blocks, in render order.
pub fn builtin_targets() -> Result<Vec<RenderTarget>> {
    [
        ("featured", "data/featured.json", ".grid", FEATURED),
        ("announcements", "data/announcements.json", ".announcements-container", ANNOUNCEMENTS),
        ("roadmap", "data/roadmap.json", ".roadmap-timeline", ROADMAP),
        ("resources", "data/resources.json", ".resources-tbody", RESOURCES),
        ("faq", "data/faq.json", ".faq-container", FAQ),
        ("features", "data/features.json", ".features-grid", FEATURES),
        ("categories", "data/categories.json", ".categories-grid", CATEGORIES),
    ]
    .into_iter()
    .map(|(name, path, mount, template)| RenderTarget::new(name, path, mount, template))
    .collect()
}

pub fn builtin_fragments() -> Result<Vec<FragmentTarget>> {
    Ok(vec![
        FragmentTarget::new("#nav-container", "components/nav.html")?,
        FragmentTarget::new("#footer-container", "components/footer.html")?,
    ])
}
