//! Static page generation.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use strata_core::{
    LoadedRenderer, RenderContext, RenderError, RouteCache, RouteKind, SiteConfig, SsrElement,
};
use strata_render::{link_stylesheet_elements, module_script_elements, render, RenderOutcome};

use crate::entry::{EndpointOutput, PageModule, ServerEntry, ServerEntryLoader};
use crate::internals::{BuildInternals, EntrySpecifierMap, PageBuildData};
use crate::output::{out_file, out_folder};
use crate::report::{GenerationReport, PathOutcome};
use crate::resolve::{get_by_facade_id, SpecifierResolver};
use crate::scheduler::BatchScheduler;

const TARGET: &str = "strata::build";

/// Origin used when none is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost";

/// Options shared by every page of a build.
#[derive(Debug, Clone)]
pub struct StaticBuildOptions {
    /// Site configuration.
    pub config: Arc<SiteConfig>,
    /// Origin pages are rendered for.
    pub origin: String,
    /// Expanded route metadata.
    pub route_cache: Arc<RouteCache>,
}

impl StaticBuildOptions {
    /// Create options from a site configuration.
    pub fn new(config: SiteConfig) -> Self {
        Self {
            config: Arc::new(config),
            origin: DEFAULT_ORIGIN.to_string(),
            route_cache: Arc::new(RouteCache::new()),
        }
    }

    /// Set the origin.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set the route cache.
    pub fn with_route_cache(mut self, cache: RouteCache) -> Self {
        self.route_cache = Arc::new(cache);
        self
    }
}

/// Everything a page generation reads. Built once per build.
pub struct BuildScope<'a> {
    opts: &'a StaticBuildOptions,
    internals: &'a BuildInternals,
    entry: &'a ServerEntry,
    entries: Arc<EntrySpecifierMap>,
    optional: Arc<BTreeMap<String, String>>,
    renderers: Arc<[LoadedRenderer]>,
}

impl<'a> BuildScope<'a> {
    /// Create a scope over a loaded server entry.
    pub fn new(opts: &'a StaticBuildOptions, internals: &'a BuildInternals, entry: &'a ServerEntry) -> Self {
        Self {
            opts,
            internals,
            entry,
            entries: Arc::new(internals.entry_specifier_map.clone()),
            optional: Arc::new(opts.config.build.optional_specifiers.clone()),
            renderers: Arc::from(entry.renderers.clone()),
        }
    }
}

impl fmt::Debug for BuildScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildScope")
            .field("pages", &self.internals.pages.len())
            .field("modules", &self.entry.page_map.len())
            .finish_non_exhaustive()
    }
}

/// Per-page inputs to `generate_path`.
#[derive(Debug)]
pub struct GeneratePathOptions<'a> {
    /// Page being generated.
    pub page_data: &'a PageBuildData,
    /// Stylesheet ids, latest-declared first.
    pub link_ids: Vec<String>,
    /// Hoisted script id.
    pub hoisted_id: Option<String>,
    /// Loaded page module.
    pub module: &'a PageModule,
}

/// Generate every page of the build.
///
/// Pages run one after another; a failing page or path never stops the
/// others. Only failing to load the server entry aborts generation.
pub async fn generate_pages(
    opts: &StaticBuildOptions,
    internals: &BuildInternals,
    loader: &dyn ServerEntryLoader,
) -> Result<GenerationReport, RenderError> {
    tracing::debug!(target: TARGET, "Finish build. Begin generating.");

    let ssr = opts.config.is_ssr();
    let entry_path = opts.config.entry_dir().join(&opts.config.build.server_entry);
    tracing::debug!(target: TARGET, ssr, entry = %entry_path.display(), "Loading server entry");
    let entry = loader.load(&entry_path).await?;

    let scope = BuildScope::new(opts, internals, &entry);
    let mut report = GenerationReport::default();

    for page_data in internals.each_page_data() {
        match generate_page(&scope, page_data).await {
            Ok(outcomes) => {
                for (pathname, outcome) in page_data.paths.iter().zip(outcomes) {
                    report.record(page_data, pathname, outcome);
                }
            }
            Err(err) => {
                tracing::error!(
                    target: TARGET,
                    component = %page_data.component,
                    error = %err,
                    "Error generating page"
                );
                for pathname in &page_data.paths {
                    report.record(page_data, pathname, PathOutcome::Failed(err.to_string()));
                }
            }
        }
    }

    Ok(report)
}

/// Generate every path of one page, throttled into batches.
///
/// Returns one outcome per path, in enumeration order.
pub async fn generate_page(
    scope: &BuildScope<'_>,
    page_data: &PageBuildData,
) -> Result<Vec<PathOutcome>, RenderError> {
    let info = scope
        .internals
        .page_data_by_component(&page_data.route.component);
    // Later-declared styles take priority
    let link_ids: Vec<String> = info
        .map(|info| info.css.iter().rev().cloned().collect())
        .unwrap_or_default();
    let hoisted_id = info.and_then(|info| info.hoisted_script.clone());

    let module = get_by_facade_id(&page_data.component, &scope.entry.page_map)
        .ok_or_else(|| RenderError::ModuleNotFound(page_data.component.clone()))?;

    let gopts = GeneratePathOptions {
        page_data,
        link_ids,
        hoisted_id,
        module,
    };

    let scheduler = BatchScheduler::new(scope.opts.config.build.concurrency());
    Ok(scheduler
        .run(&page_data.paths, |pathname| generate_path(pathname, scope, &gopts))
        .await)
}

/// Render one path and write its file.
///
/// Errors are logged and reported, never propagated.
pub async fn generate_path(
    pathname: &str,
    scope: &BuildScope<'_>,
    gopts: &GeneratePathOptions<'_>,
) -> PathOutcome {
    tracing::debug!(target: TARGET, path = pathname, "Generating");

    match render_path(pathname, scope, gopts).await {
        Ok(Some(file)) => PathOutcome::Written(file),
        Ok(None) => PathOutcome::Skipped,
        Err(err) => {
            tracing::error!(
                target: TARGET,
                path = pathname,
                route = %gopts.page_data.route.pattern,
                component = %gopts.page_data.component,
                error = %err,
                "Error rendering"
            );
            PathOutcome::Failed(err.to_string())
        }
    }
}

fn path_context(pathname: &str, scope: &BuildScope<'_>, gopts: &GeneratePathOptions<'_>) -> RenderContext {
    let config = &scope.opts.config;
    let site = config.site.as_deref();

    let links = link_stylesheet_elements(&gopts.link_ids, site);
    let mut scripts = module_script_elements(gopts.hoisted_id.iter(), site);
    scripts.extend(config.head_inline_scripts().map(SsrElement::inline));

    let resolver = SpecifierResolver::new(scope.entries.clone(), scope.optional.clone(), pathname);

    RenderContext::new(gopts.page_data.route.clone(), pathname, Arc::new(resolver))
        .with_site(config.site.clone())
        .with_origin(scope.opts.origin.clone())
        .with_route_cache(scope.opts.route_cache.clone())
        .with_renderers(scope.renderers.clone())
        .with_head(links, scripts)
}

async fn render_path(
    pathname: &str,
    scope: &BuildScope<'_>,
    gopts: &GeneratePathOptions<'_>,
) -> Result<Option<std::path::PathBuf>, RenderError> {
    let mut ctx = path_context(pathname, scope, gopts);
    let route = &gopts.page_data.route;

    let body = match (route.kind, gopts.module) {
        (RouteKind::Endpoint, PageModule::Endpoint(handler)) => match handler.call(&mut ctx).await? {
            EndpointOutput::Body(body) => body,
            EndpointOutput::Response(_) => {
                return Err(RenderError::UnsupportedOutput(
                    "Returning a Response from an endpoint is not supported in static output".into(),
                ))
            }
        },
        (RouteKind::Page, PageModule::Page(unit)) => {
            let props = ctx.props();
            match render(&mut ctx, unit, props).await? {
                RenderOutcome::Html(html) => html,
                RenderOutcome::Response(response) => {
                    tracing::debug!(
                        target: TARGET,
                        path = pathname,
                        status = %response.status(),
                        "Skipping non-HTML result"
                    );
                    return Ok(None);
                }
            }
        }
        (kind, _) => {
            return Err(RenderError::ContractViolation(format!(
                "{} is routed as {kind:?} but its module is not",
                gopts.page_data.component
            )))
        }
    };

    let config = &scope.opts.config;
    let format = config.build.page_url_format;
    let folder = out_folder(&config.out_dir, pathname, route.kind, format);
    let file = out_file(&folder, pathname, route.kind, format);

    tokio::fs::create_dir_all(&folder)
        .await
        .map_err(|e| RenderError::io(&folder, e))?;
    write_file(&file, &body).await?;

    Ok(Some(file))
}

/// Write through a sibling temp file so a failed write leaves nothing behind.
async fn write_file(file: &Path, body: &str) -> Result<(), RenderError> {
    let name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = file.with_file_name(format!(".{name}.strata-tmp"));

    if let Err(e) = tokio::fs::write(&tmp, body).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(RenderError::io(&tmp, e));
    }
    if let Err(e) = tokio::fs::rename(&tmp, file).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(RenderError::io(file, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_file_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");

        write_file(&file, "first").await.unwrap();
        write_file(&file, "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&file).unwrap(), "second");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".strata-tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_write_file_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing").join("index.html");

        let err = write_file(&file, "x").await.unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
        assert!(!file.exists());
    }

    #[test]
    fn test_options_defaults() {
        let opts = StaticBuildOptions::new(SiteConfig::default());
        assert_eq!(opts.origin, DEFAULT_ORIGIN);
        assert!(opts.route_cache.is_empty());
    }
}
