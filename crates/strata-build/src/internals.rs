//! Build registry produced by the bundling phase.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strata_core::RouteData;

/// Mapping from a logical module specifier to its hashed output path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntrySpecifierMap(HashMap<String, String>);

impl EntrySpecifierMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the hashed path of a specifier.
    pub fn insert(&mut self, specifier: impl Into<String>, hashed: impl Into<String>) {
        self.0.insert(specifier.into(), hashed.into());
    }

    /// Look up the hashed path of a specifier.
    pub fn get(&self, specifier: &str) -> Option<&str> {
        self.0.get(specifier).map(String::as_str)
    }

    /// Check if a specifier was bundled.
    pub fn contains(&self, specifier: &str) -> bool {
        self.0.contains_key(specifier)
    }

    /// Number of bundled specifiers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing was bundled.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for EntrySpecifierMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A page to generate and every concrete path it expands to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBuildData {
    /// Page component identifier.
    pub component: String,
    /// Route the component is registered under.
    pub route: RouteData,
    /// Concrete output paths, in enumeration order.
    #[serde(default)]
    pub paths: Vec<String>,
}

impl PageBuildData {
    /// Create page build data for a route.
    pub fn new(route: RouteData, paths: Vec<String>) -> Self {
        Self {
            component: route.component.clone(),
            route,
            paths,
        }
    }
}

/// Assets the bundler collected for one page component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Stylesheet ids, in declaration order.
    #[serde(default)]
    pub css: Vec<String>,
    /// Hoisted script id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hoisted_script: Option<String>,
}

/// Registry shared by every render of a build. Read-only during generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildInternals {
    /// Bundled entry specifiers.
    #[serde(default)]
    pub entry_specifier_map: EntrySpecifierMap,
    /// Pages in registration order.
    #[serde(default)]
    pub pages: Vec<PageBuildData>,
    /// Bundled assets per page component.
    #[serde(default)]
    pub page_info: HashMap<String, PageInfo>,
}

impl BuildInternals {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page.
    pub fn add_page(&mut self, page: PageBuildData) {
        self.pages.push(page);
    }

    /// Iterate pages in registration order.
    pub fn each_page_data(&self) -> impl Iterator<Item = &PageBuildData> {
        self.pages.iter()
    }

    /// Bundled assets for a page component.
    pub fn page_data_by_component(&self, component: &str) -> Option<&PageInfo> {
        self.page_info.get(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_internals_from_json() {
        let internals: BuildInternals = serde_json::from_value(json!({
            "entry_specifier_map": {
                "/src/pages/index.astro": "entry.index.a1b2.js",
                "astro:scripts/page.js": "page.c3d4.js"
            },
            "pages": [{
                "component": "src/pages/index.astro",
                "route": { "type": "page", "pattern": "/", "component": "src/pages/index.astro" },
                "paths": ["/"]
            }],
            "page_info": {
                "src/pages/index.astro": { "css": ["assets/index.css"], "hoisted_script": "hoisted.js" }
            }
        }))
        .unwrap();

        assert_eq!(internals.entry_specifier_map.len(), 2);
        assert_eq!(
            internals.entry_specifier_map.get("astro:scripts/page.js"),
            Some("page.c3d4.js")
        );
        assert_eq!(internals.each_page_data().count(), 1);
        let info = internals.page_data_by_component("src/pages/index.astro").unwrap();
        assert_eq!(info.css, vec!["assets/index.css"]);
        assert_eq!(info.hoisted_script.as_deref(), Some("hoisted.js"));
    }

    #[test]
    fn test_page_build_data_takes_route_component() {
        let page = PageBuildData::new(
            RouteData::page("/blog/[slug]", "src/pages/blog/[slug].astro"),
            vec!["/blog/a/".into(), "/blog/b/".into()],
        );
        assert_eq!(page.component, "src/pages/blog/[slug].astro");
        assert_eq!(page.paths.len(), 2);
    }
}
