//! UI-framework renderer interface.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::route::Props;

/// Static metadata for a configured UI-framework renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Renderer name (e.g., "@astrojs/preact").
    pub name: String,
    /// Client-side hydration entrypoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_entrypoint: Option<String>,
    /// Server-side rendering entrypoint.
    pub server_entrypoint: String,
}

/// Server-side half of a UI-framework renderer.
#[async_trait]
pub trait SsrRenderer: Send + Sync {
    /// Check whether this renderer can render the given component.
    async fn check(&self, component: &str, props: &Props) -> bool;

    /// Render a component to static markup.
    async fn render_to_static_markup(
        &self,
        component: &str,
        props: &Props,
        children: Option<&str>,
    ) -> Result<String, RenderError>;
}

/// A renderer whose server entrypoint has been loaded.
#[derive(Clone)]
pub struct LoadedRenderer {
    /// Static metadata.
    pub config: RendererConfig,
    /// Loaded server-side renderer.
    pub ssr: Arc<dyn SsrRenderer>,
}

impl LoadedRenderer {
    /// Pair static metadata with a loaded renderer.
    pub fn new(config: RendererConfig, ssr: Arc<dyn SsrRenderer>) -> Self {
        Self { config, ssr }
    }

    /// Renderer name.
    pub fn name(&self) -> &str {
        &self.config.name
    }
}

impl fmt::Debug for LoadedRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedRenderer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
