//! The style-application target.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

/// Global, document-level style state.
///
/// Mirrors what a UI host exposes for theming: custom properties on the root
/// element, root attributes, root classes and identified stylesheets.
/// Methods take `&self`; implementations synchronize internally.
pub trait StyleTarget: Send + Sync {
    fn set_property(&self, name: &str, value: &str);
    fn remove_property(&self, name: &str);
    fn set_attribute(&self, name: &str, value: &str);
    /// Adds `class` when `enabled`, removes it otherwise.
    fn set_class(&self, class: &str, enabled: bool);
    fn has_stylesheet(&self, id: &str) -> bool;
    /// Inserts or replaces the stylesheet with this id.
    fn insert_stylesheet(&self, id: &str, css: &str);
    fn remove_stylesheet(&self, id: &str);
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct DocumentState {
    properties: BTreeMap<String, String>,
    attributes: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    stylesheets: BTreeMap<String, String>,
}

/// In-memory [`StyleTarget`], for headless hosts and tests.
///
/// Hosts that render elsewhere (a terminal, a native toolkit) read the
/// resulting state back through the accessors.
#[derive(Debug, Default)]
pub struct Document {
    state: Mutex<DocumentState>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(&self, name: &str) -> Option<String> {
        self.lock().properties.get(name).cloned()
    }

    /// All custom properties, sorted by name.
    pub fn properties(&self) -> Vec<(String, String)> {
        self.lock()
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.lock().attributes.get(name).cloned()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.lock().classes.contains(class)
    }

    pub fn stylesheet(&self, id: &str) -> Option<String> {
        self.lock().stylesheets.get(id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, DocumentState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StyleTarget for Document {
    fn set_property(&self, name: &str, value: &str) {
        self.lock()
            .properties
            .insert(name.to_string(), value.to_string());
    }

    fn remove_property(&self, name: &str) {
        self.lock().properties.remove(name);
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.lock()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn set_class(&self, class: &str, enabled: bool) {
        let mut state = self.lock();
        if enabled {
            state.classes.insert(class.to_string());
        } else {
            state.classes.remove(class);
        }
    }

    fn has_stylesheet(&self, id: &str) -> bool {
        self.lock().stylesheets.contains_key(id)
    }

    fn insert_stylesheet(&self, id: &str, css: &str) {
        self.lock()
            .stylesheets
            .insert(id.to_string(), css.to_string());
    }

    fn remove_stylesheet(&self, id: &str) {
        self.lock().stylesheets.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_properties_and_classes() {
        let doc = Document::new();
        doc.set_property("--a", "1");
        doc.set_property("--b", "2");
        doc.remove_property("--a");
        doc.set_class("dark", true);
        doc.set_class("dark", true);
        doc.set_attribute("data-theme", "dark");

        assert_eq!(doc.properties(), vec![("--b".to_string(), "2".to_string())]);
        assert!(doc.has_class("dark"));
        assert_eq!(doc.attribute("data-theme").as_deref(), Some("dark"));

        doc.set_class("dark", false);
        assert!(!doc.has_class("dark"));
    }

    #[test]
    fn test_document_stylesheets() {
        let doc = Document::new();
        assert!(!doc.has_stylesheet("s"));
        doc.insert_stylesheet("s", "a{}");
        assert_eq!(doc.stylesheet("s").as_deref(), Some("a{}"));
        doc.remove_stylesheet("s");
        assert!(!doc.has_stylesheet("s"));
    }
}
