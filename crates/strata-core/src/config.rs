//! Site and build configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::renderer::RendererConfig;

/// Specifier of the optional before-hydration script.
pub const BEFORE_HYDRATION_SPECIFIER: &str = "astro:scripts/before-hydration.js";

/// Inert placeholder served when no before-hydration script was bundled.
pub const BEFORE_HYDRATION_PLACEHOLDER: &str =
    "data:text/javascript;charset=utf-8,//[no before-hydration script]";

/// Top-level site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Deployed site URL, including any base path (e.g., "https://example.com/docs/").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,

    /// Directory static pages are written to.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Build configuration.
    #[serde(default)]
    pub build: BuildConfig,

    /// Server adapter; present when the build targets server rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<AdapterConfig>,

    /// UI-framework renderers.
    #[serde(default)]
    pub renderers: Vec<RendererConfig>,

    /// Scripts injected by integrations.
    #[serde(default)]
    pub scripts: Vec<InjectedScript>,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: None,
            out_dir: default_out_dir(),
            build: BuildConfig::default(),
            adapter: None,
            renderers: Vec::new(),
            scripts: Vec::new(),
        }
    }
}

impl SiteConfig {
    /// Whether the build targets server rendering.
    pub fn is_ssr(&self) -> bool {
        self.adapter.is_some()
    }

    /// Directory holding the compiled server entry for this build target.
    pub fn entry_dir(&self) -> &PathBuf {
        if self.is_ssr() {
            &self.build.server
        } else {
            &self.build.client
        }
    }

    /// Inline scripts injected into every page head.
    pub fn head_inline_scripts(&self) -> impl Iterator<Item = &str> {
        self.scripts
            .iter()
            .filter(|s| s.stage == ScriptStage::HeadInline)
            .map(|s| s.content.as_str())
    }
}

/// How page paths map to files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageUrlFormat {
    /// `/about` is written to `about/index.html`.
    #[default]
    Directory,
    /// `/about` is written to `about.html`.
    File,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Client bundle output directory.
    #[serde(default = "default_client")]
    pub client: PathBuf,

    /// Server bundle output directory.
    #[serde(default = "default_server")]
    pub server: PathBuf,

    /// File name of the compiled server entry.
    #[serde(default = "default_server_entry")]
    pub server_entry: String,

    /// How page paths map to output files.
    #[serde(default)]
    pub page_url_format: PageUrlFormat,

    /// Maximum renders in flight per page (0 is treated as 1).
    #[serde(default = "default_max_concurrent_renders")]
    pub max_concurrent_renders: usize,

    /// Specifiers that resolve to a placeholder when missing from the build.
    #[serde(default = "default_optional_specifiers")]
    pub optional_specifiers: BTreeMap<String, String>,
}

fn default_client() -> PathBuf {
    PathBuf::from("dist/client")
}

fn default_server() -> PathBuf {
    PathBuf::from("dist/server")
}

fn default_server_entry() -> String {
    "entry.json".to_string()
}

fn default_max_concurrent_renders() -> usize {
    1
}

fn default_optional_specifiers() -> BTreeMap<String, String> {
    BTreeMap::from([(
        BEFORE_HYDRATION_SPECIFIER.to_string(),
        BEFORE_HYDRATION_PLACEHOLDER.to_string(),
    )])
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            client: default_client(),
            server: default_server(),
            server_entry: default_server_entry(),
            page_url_format: PageUrlFormat::default(),
            max_concurrent_renders: default_max_concurrent_renders(),
            optional_specifiers: default_optional_specifiers(),
        }
    }
}

impl BuildConfig {
    /// Effective render concurrency.
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_renders.max(1)
    }
}

/// Server adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Adapter name.
    pub name: String,
    /// Server entrypoint the adapter provides.
    pub server_entrypoint: String,
}

/// Stage an injected script runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptStage {
    HeadInline,
    BeforeHydration,
    Page,
}

/// A script injected by an integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectedScript {
    /// When the script runs.
    pub stage: ScriptStage,
    /// Script source.
    pub content: String,
}
