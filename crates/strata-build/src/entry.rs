//! Compiled server entry supplied by the bundler.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use http::Response;
use strata_core::{LoadedRenderer, RenderContext, RenderError};
use strata_render::{Body, PageUnit};

/// What an endpoint handler returns.
pub enum EndpointOutput {
    /// A body to persist as-is.
    Body(String),
    /// A native response. Not supported in static output.
    Response(Response<Body>),
}

impl fmt::Debug for EndpointOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body(body) => f.debug_tuple("Body").field(&body.len()).finish(),
            Self::Response(response) => f.debug_tuple("Response").field(&response.status()).finish(),
        }
    }
}

/// Handler behind an endpoint route.
#[async_trait]
pub trait EndpointHandler: Send + Sync {
    /// Handle one request.
    async fn call(&self, ctx: &mut RenderContext) -> Result<EndpointOutput, RenderError>;
}

/// A loaded page-component module.
#[derive(Clone)]
pub enum PageModule {
    Page(PageUnit),
    Endpoint(Arc<dyn EndpointHandler>),
}

impl fmt::Debug for PageModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(unit) => f.debug_tuple("Page").field(unit).finish(),
            Self::Endpoint(_) => f.write_str("Endpoint(..)"),
        }
    }
}

/// The single aggregated server entry of a build.
#[derive(Debug, Clone, Default)]
pub struct ServerEntry {
    /// Loaded UI-framework renderers.
    pub renderers: Vec<LoadedRenderer>,
    /// Page modules keyed by component id.
    pub page_map: HashMap<String, PageModule>,
}

impl ServerEntry {
    /// Create an entry with no pages.
    pub fn new(renderers: Vec<LoadedRenderer>) -> Self {
        Self {
            renderers,
            page_map: HashMap::new(),
        }
    }

    /// Register a page module.
    pub fn with_module(mut self, component: impl Into<String>, module: PageModule) -> Self {
        self.page_map.insert(component.into(), module);
        self
    }
}

/// Loads the compiled server entry.
#[async_trait]
pub trait ServerEntryLoader: Send + Sync {
    /// Load the entry at `path`.
    async fn load(&self, path: &Path) -> Result<ServerEntry, RenderError>;
}
