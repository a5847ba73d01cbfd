//! Per-render context.

use std::fmt;
use std::sync::Arc;

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};

use crate::error::RenderError;
use crate::renderer::LoadedRenderer;
use crate::route::{Props, RouteCache, RouteData};

/// Resolves a logical module specifier to a URL the rendered page can load.
pub trait ResolveSpecifier: Send + Sync {
    /// Resolve a specifier (e.g., "astro:scripts/before-hydration.js").
    fn resolve(&self, specifier: &str) -> Result<String, RenderError>;
}

impl<F> ResolveSpecifier for F
where
    F: Fn(&str) -> Result<String, RenderError> + Send + Sync,
{
    fn resolve(&self, specifier: &str) -> Result<String, RenderError> {
        self(specifier)
    }
}

/// An element injected into the document head.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SsrElement {
    /// Attributes in insertion order.
    pub props: Vec<(String, String)>,
    /// Inner content.
    pub children: String,
}

impl SsrElement {
    /// Create an element with the given attributes and no children.
    pub fn with_props(props: Vec<(&str, String)>) -> Self {
        Self {
            props: props.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            children: String::new(),
        }
    }

    /// Create an inline element with no attributes.
    pub fn inline(children: impl Into<String>) -> Self {
        Self {
            props: Vec::new(),
            children: children.into(),
        }
    }

    /// Get an attribute value.
    pub fn prop(&self, name: &str) -> Option<&str> {
        self.props
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and headers a page accumulates while rendering.
#[derive(Debug, Clone)]
pub struct ResponseInit {
    /// Response status.
    pub status: StatusCode,
    /// Accumulated response headers.
    pub headers: HeaderMap,
}

impl Default for ResponseInit {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }
}

/// State threaded through a single render.
///
/// Owned by exactly one render; never shared between concurrent renders.
pub struct RenderContext {
    /// Configured site URL (origin plus base path).
    pub site: Option<String>,
    /// Origin the page is rendered for.
    pub origin: String,
    /// Concrete path being rendered (e.g., "/about/").
    pub pathname: String,
    /// Request method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// Route the path belongs to.
    pub route: RouteData,
    /// Previously expanded route metadata.
    pub route_cache: Arc<RouteCache>,
    /// Loaded UI-framework renderers.
    pub renderers: Arc<[LoadedRenderer]>,
    /// Stylesheet link elements for the head.
    pub links: Vec<SsrElement>,
    /// Script elements for the head.
    pub scripts: Vec<SsrElement>,
    /// Response status and headers accumulated during the render.
    pub response: ResponseInit,
    resolver: Arc<dyn ResolveSpecifier>,
}

impl RenderContext {
    /// Create a context for a GET render of `pathname`.
    pub fn new(
        route: RouteData,
        pathname: impl Into<String>,
        resolver: Arc<dyn ResolveSpecifier>,
    ) -> Self {
        Self {
            site: None,
            origin: String::new(),
            pathname: pathname.into(),
            method: Method::GET,
            headers: HeaderMap::new(),
            route,
            route_cache: Arc::new(RouteCache::new()),
            renderers: Arc::from(Vec::new()),
            links: Vec::new(),
            scripts: Vec::new(),
            response: ResponseInit::default(),
            resolver,
        }
    }

    /// Set the site URL.
    pub fn with_site(mut self, site: Option<String>) -> Self {
        self.site = site;
        self
    }

    /// Set the origin.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set the request method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the request headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the route cache.
    pub fn with_route_cache(mut self, cache: Arc<RouteCache>) -> Self {
        self.route_cache = cache;
        self
    }

    /// Set the loaded renderers.
    pub fn with_renderers(mut self, renderers: Arc<[LoadedRenderer]>) -> Self {
        self.renderers = renderers;
        self
    }

    /// Set the head link and script elements.
    pub fn with_head(mut self, links: Vec<SsrElement>, scripts: Vec<SsrElement>) -> Self {
        self.links = links;
        self.scripts = scripts;
        self
    }

    /// Resolve a module specifier for this render.
    pub fn resolve(&self, specifier: &str) -> Result<String, RenderError> {
        self.resolver.resolve(specifier)
    }

    /// Props recorded for this path during route expansion.
    pub fn props(&self) -> Props {
        self.route_cache
            .props(&self.route.pattern, &self.pathname)
            .cloned()
            .unwrap_or_default()
    }

    /// Set a response header, replacing any previous value.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response.headers.insert(name, value);
    }

    /// Set the response status.
    pub fn set_status(&mut self, status: StatusCode) {
        self.response.status = status;
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("site", &self.site)
            .field("pathname", &self.pathname)
            .field("method", &self.method)
            .field("route", &self.route)
            .field("links", &self.links.len())
            .field("scripts", &self.scripts.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolver() -> Arc<dyn ResolveSpecifier> {
        Arc::new(|specifier: &str| -> Result<String, RenderError> {
            Ok(format!("./{specifier}"))
        })
    }

    #[test]
    fn test_context_defaults() {
        let ctx = RenderContext::new(RouteData::page("/", "src/pages/index.astro"), "/", resolver());

        assert_eq!(ctx.method, Method::GET);
        assert_eq!(ctx.response.status, StatusCode::OK);
        assert!(ctx.response.headers.is_empty());
        assert!(ctx.renderers.is_empty());
        assert!(ctx.props().is_empty());
    }

    #[test]
    fn test_context_resolves_through_resolver() {
        let ctx = RenderContext::new(RouteData::page("/", "src/pages/index.astro"), "/", resolver());
        assert_eq!(ctx.resolve("chunks/a.js").unwrap(), "./chunks/a.js");
    }

    #[test]
    fn test_context_props_from_route_cache() {
        let mut cache = RouteCache::new();
        let mut props = Props::new();
        props.insert("title".into(), json!("Hello"));
        cache.insert("/posts/[slug]", "/posts/hello/", props);

        let ctx = RenderContext::new(
            RouteData::page("/posts/[slug]", "src/pages/posts/[slug].astro"),
            "/posts/hello/",
            resolver(),
        )
        .with_route_cache(Arc::new(cache));

        assert_eq!(ctx.props()["title"], json!("Hello"));
    }

    #[test]
    fn test_set_header_accumulates() {
        let mut ctx = RenderContext::new(RouteData::page("/", "src/pages/index.astro"), "/", resolver());
        ctx.set_header(
            HeaderName::from_static("x-powered-by"),
            HeaderValue::from_static("strata"),
        );
        ctx.set_status(StatusCode::CREATED);

        assert_eq!(ctx.response.headers["x-powered-by"], "strata");
        assert_eq!(ctx.response.status, StatusCode::CREATED);
    }

    #[test]
    fn test_ssr_element_prop_lookup() {
        let el = SsrElement::with_props(vec![("rel", "stylesheet".into()), ("href", "/a.css".into())]);
        assert_eq!(el.prop("href"), Some("/a.css"));
        assert_eq!(el.prop("media"), None);
    }
}
