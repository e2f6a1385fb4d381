use crate::domain::model::{Selector, ToggleBinding};
use crate::domain::ports::Document;
use crate::utils::error::Result;

/// Mobile navigation: clicking `toggle` flips `active_class` on `menu`.
#[derive(Debug, Clone, PartialEq)]
pub struct NavToggle {
    pub toggle: Selector,
    pub menu: Selector,
    pub active_class: String,
}

impl Default for NavToggle {
    fn default() -> Self {
        Self {
            toggle: Selector::class("nav-toggle"),
            menu: Selector::class("nav-links"),
            active_class: "active".to_string(),
        }
    }
}

/// Binds the toggle when both elements exist. Must run after the nav
/// fragment is loaded, since that is where both usually live.
pub fn wire_nav_toggle<D: Document + ?Sized>(document: &mut D, nav: &NavToggle) -> Result<bool> {
    if !document.exists(&nav.toggle) || !document.exists(&nav.menu) {
        tracing::debug!("Nav toggle not wired: {} or {} absent", nav.toggle, nav.menu);
        return Ok(false);
    }

    document.bind_toggle(ToggleBinding {
        trigger: nav.toggle.clone(),
        target: nav.menu.clone(),
        class: nav.active_class.clone(),
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::HtmlDocument;

    #[test]
    fn test_wires_when_both_present() {
        let mut doc = HtmlDocument::new(
            r#"<nav><button class="nav-toggle">Menu</button><ul class="nav-links"></ul></nav>"#,
        );
        let nav = NavToggle::default();

        assert!(wire_nav_toggle(&mut doc, &nav).unwrap());
        doc.click(&nav.toggle).unwrap();
        assert!(doc.has_class(&nav.menu, "active"));
    }

    #[test]
    fn test_skips_when_menu_missing() {
        let mut doc = HtmlDocument::new(r#"<button class="nav-toggle">Menu</button>"#);
        assert!(!wire_nav_toggle(&mut doc, &NavToggle::default()).unwrap());
        assert!(doc.bindings().is_empty());
        assert_eq!(doc.html(), r#"<button class="nav-toggle">Menu</button>"#);
    }
}
