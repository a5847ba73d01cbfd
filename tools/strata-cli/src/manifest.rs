//! File-backed build plan and server entry.
//!
//! The server entry is a JSON manifest next to the compiled output:
//!
//! ```json
//! {
//!   "pages": {
//!     "src/pages/index.md": { "template": "pages/index.html", "head_injection": true }
//!   },
//!   "endpoints": {
//!     "src/pages/feed.xml.ts": { "body": "endpoints/feed.xml" }
//!   }
//! }
//! ```
//!
//! Templates may reference `{{ pathname }}`, `{{ props.<name> }}` and
//! `{{ resolve <specifier> }}`.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context as _, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use strata_build::{
    load_renderers, BuildInternals, EndpointHandler, EndpointOutput, PageModule, RendererRegistry,
    ServerEntry, ServerEntryLoader,
};
use strata_core::{Props, RenderContext, RenderError, RendererConfig, RouteCache};
use strata_render::{chunk_stream, Chunk, ChunkStream, PageUnit, PlainModule, PlainRender};

/// File name of the build plan inside the entry directory.
pub const BUILD_PLAN_FILE: &str = "build-plan.json";

/// Pages to generate plus the props of each expanded path.
#[derive(Debug, Default, Deserialize)]
pub struct BuildPlan {
    #[serde(flatten)]
    pub internals: BuildInternals,
    /// Props keyed by route pattern, then pathname.
    #[serde(default)]
    pub props: HashMap<String, HashMap<String, Props>>,
}

impl BuildPlan {
    /// Load a build plan from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read build plan: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse build plan: {}", path.display()))
    }

    /// Route cache holding every recorded prop set.
    pub fn route_cache(&self) -> RouteCache {
        let mut cache = RouteCache::new();
        for (pattern, paths) in &self.props {
            for (pathname, props) in paths {
                cache.insert(pattern.clone(), pathname.clone(), props.clone());
            }
        }
        cache
    }

    /// Number of paths across all pages.
    pub fn path_count(&self) -> usize {
        self.internals.pages.iter().map(|page| page.paths.len()).sum()
    }
}

#[derive(Debug, Default, Deserialize)]
struct EntryManifest {
    #[serde(default)]
    pages: BTreeMap<String, PageTemplate>,
    #[serde(default)]
    endpoints: BTreeMap<String, EndpointFile>,
}

#[derive(Debug, Deserialize)]
struct PageTemplate {
    template: PathBuf,
    #[serde(default)]
    head_injection: bool,
}

#[derive(Debug, Deserialize)]
struct EndpointFile {
    body: PathBuf,
}

/// Loads the server entry from a JSON manifest.
pub struct FileEntryLoader {
    renderers: Vec<RendererConfig>,
    registry: RendererRegistry,
}

impl FileEntryLoader {
    /// Create a loader for the configured renderers.
    pub fn new(renderers: Vec<RendererConfig>, registry: RendererRegistry) -> Self {
        Self { renderers, registry }
    }
}

async fn read_to_string(path: &Path) -> Result<String, RenderError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RenderError::io(path, e))
}

#[async_trait]
impl ServerEntryLoader for FileEntryLoader {
    async fn load(&self, path: &Path) -> Result<ServerEntry, RenderError> {
        let manifest: EntryManifest = serde_json::from_str(&read_to_string(path).await?)
            .map_err(|e| anyhow!("Failed to parse server entry {}: {e}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        let renderers = load_renderers(&self.renderers, &self.registry).await?;
        let mut entry = ServerEntry::new(renderers);

        for (component, page) in manifest.pages {
            let source = read_to_string(&base.join(&page.template)).await?;
            let module = PlainModule::new(component.clone(), Arc::new(Template { source }))
                .with_head_injection(page.head_injection);
            tracing::debug!(target: "strata::build", component = %component, "Loaded page template");
            entry = entry.with_module(component, PageModule::Page(PageUnit::Plain(module)));
        }

        for (component, endpoint) in manifest.endpoints {
            let body = read_to_string(&base.join(&endpoint.body)).await?;
            entry = entry.with_module(component, PageModule::Endpoint(Arc::new(StaticEndpoint(body))));
        }

        Ok(entry)
    }
}

/// Plain page rendered from an HTML template.
struct Template {
    source: String,
}

#[async_trait]
impl PlainRender for Template {
    async fn render(&self, ctx: &RenderContext, props: Props) -> Result<ChunkStream, RenderError> {
        let html = fill(&self.source, ctx, &props)?;
        Ok(chunk_stream(vec![Chunk::html(html)]))
    }
}

/// Substitute `{{ ... }}` placeholders. Unknown placeholders are kept.
fn fill(source: &str, ctx: &RenderContext, props: &Props) -> Result<String, RenderError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start..].find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);
        let raw = &rest[start..start + len + 2];
        let key = raw[2..raw.len() - 2].trim();

        if key == "pathname" {
            out.push_str(&ctx.pathname);
        } else if let Some(specifier) = key.strip_prefix("resolve ") {
            out.push_str(&ctx.resolve(specifier.trim())?);
        } else if let Some(value) = key.strip_prefix("props.").and_then(|name| props.get(name)) {
            match value {
                Value::String(s) => out.push_str(s),
                other => out.push_str(&other.to_string()),
            }
        } else {
            out.push_str(raw);
        }
        rest = &rest[start + len + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Endpoint answering with a fixed body.
struct StaticEndpoint(String);

#[async_trait]
impl EndpointHandler for StaticEndpoint {
    async fn call(&self, _ctx: &mut RenderContext) -> Result<EndpointOutput, RenderError> {
        Ok(EndpointOutput::Body(self.0.clone()))
    }
}
