//! Route descriptors and the route cache.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Props passed to a page unit.
pub type Props = serde_json::Map<String, serde_json::Value>;

/// Kind of route a module was registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Page,
    Endpoint,
}

/// Describes a single route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteData {
    /// Route kind.
    #[serde(rename = "type")]
    pub kind: RouteKind,
    /// Route pattern (e.g., "/posts/[slug]").
    pub pattern: String,
    /// Page component identifier (e.g., "src/pages/posts/[slug].astro").
    pub component: String,
}

impl RouteData {
    /// Create a page route.
    pub fn page(pattern: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            kind: RouteKind::Page,
            pattern: pattern.into(),
            component: component.into(),
        }
    }

    /// Create an endpoint route.
    pub fn endpoint(pattern: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            kind: RouteKind::Endpoint,
            pattern: pattern.into(),
            component: component.into(),
        }
    }

    /// Check if this route renders a page.
    pub fn is_page(&self) -> bool {
        self.kind == RouteKind::Page
    }
}

/// Props for every expanded path of each route, keyed by route pattern.
///
/// Filled once during route expansion and read-only while pages render.
#[derive(Debug, Clone, Default)]
pub struct RouteCache {
    entries: HashMap<String, HashMap<String, Props>>,
}

impl RouteCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the props for one expanded path of a route.
    pub fn insert(&mut self, pattern: impl Into<String>, pathname: impl Into<String>, props: Props) {
        self.entries
            .entry(pattern.into())
            .or_default()
            .insert(pathname.into(), props);
    }

    /// Get the props recorded for a path, if any.
    pub fn props(&self, pattern: &str, pathname: &str) -> Option<&Props> {
        self.entries.get(pattern)?.get(pathname)
    }

    /// Number of routes with cached paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
