//! Loading configured UI-framework renderers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use strata_core::{LoadedRenderer, RenderError, RendererConfig, SsrRenderer};

/// Loads the server-side half of a renderer from its entrypoint.
#[async_trait]
pub trait RendererLoader: Send + Sync {
    /// Load the renderer behind `server_entrypoint`.
    async fn load(&self, server_entrypoint: &str) -> Result<Arc<dyn SsrRenderer>, RenderError>;
}

/// Renderers registered up front, keyed by server entrypoint.
#[derive(Default, Clone)]
pub struct RendererRegistry {
    renderers: HashMap<String, Arc<dyn SsrRenderer>>,
}

impl RendererRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a renderer under its server entrypoint.
    pub fn register(mut self, server_entrypoint: impl Into<String>, ssr: Arc<dyn SsrRenderer>) -> Self {
        self.renderers.insert(server_entrypoint.into(), ssr);
        self
    }

    /// Number of registered renderers.
    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

#[async_trait]
impl RendererLoader for RendererRegistry {
    async fn load(&self, server_entrypoint: &str) -> Result<Arc<dyn SsrRenderer>, RenderError> {
        self.renderers.get(server_entrypoint).cloned().ok_or_else(|| {
            RenderError::Renderer(format!("no renderer registered for {server_entrypoint}"))
        })
    }
}

/// Load one renderer and pair it with its metadata.
pub async fn load_renderer(
    config: &RendererConfig,
    loader: &dyn RendererLoader,
) -> Result<LoadedRenderer, RenderError> {
    let ssr = loader.load(&config.server_entrypoint).await?;
    Ok(LoadedRenderer::new(config.clone(), ssr))
}

/// Load every configured renderer, keeping configuration order.
pub async fn load_renderers(
    configs: &[RendererConfig],
    loader: &dyn RendererLoader,
) -> Result<Vec<LoadedRenderer>, RenderError> {
    try_join_all(configs.iter().map(|config| load_renderer(config, loader))).await
}

#[cfg(test)]
mod tests {
    use strata_core::Props;

    use super::*;

    struct Static(&'static str);

    #[async_trait]
    impl SsrRenderer for Static {
        async fn check(&self, _component: &str, _props: &Props) -> bool {
            true
        }

        async fn render_to_static_markup(
            &self,
            _component: &str,
            _props: &Props,
            _children: Option<&str>,
        ) -> Result<String, RenderError> {
            Ok(self.0.to_string())
        }
    }

    fn config(name: &str, entry: &str) -> RendererConfig {
        RendererConfig {
            name: name.into(),
            client_entrypoint: None,
            server_entrypoint: entry.into(),
        }
    }

    #[tokio::test]
    async fn test_load_renderers_in_config_order() {
        let registry = RendererRegistry::new()
            .register("@strata/preact/server.js", Arc::new(Static("<preact/>")))
            .register("@strata/vue/server.js", Arc::new(Static("<vue/>")));

        let loaded = load_renderers(
            &[
                config("vue", "@strata/vue/server.js"),
                config("preact", "@strata/preact/server.js"),
            ],
            &registry,
        )
        .await
        .unwrap();

        let names: Vec<_> = loaded.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["vue", "preact"]);
        let markup = loaded[0]
            .ssr
            .render_to_static_markup("Counter", &Props::new(), None)
            .await
            .unwrap();
        assert_eq!(markup, "<vue/>");
    }

    #[tokio::test]
    async fn test_unknown_entrypoint_fails() {
        let err = load_renderers(&[config("solid", "@strata/solid/server.js")], &RendererRegistry::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Renderer(_)));
    }
}
