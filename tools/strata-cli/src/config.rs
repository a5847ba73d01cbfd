//! Site configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use strata_core::SiteConfig;

/// Config file names searched for, in priority order.
pub const CONFIG_NAMES: [&str; 3] = ["strata.toml", ".strata.toml", "strata.json"];

/// Load site configuration from a TOML or JSON file.
pub fn load(path: &Path) -> Result<SiteConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }
}

/// Anchor every relative directory of the config at `root`.
pub fn rooted(mut config: SiteConfig, root: &Path) -> SiteConfig {
    let anchor = |path: &mut PathBuf| {
        if path.is_relative() {
            *path = root.join(&*path);
        }
    };
    anchor(&mut config.out_dir);
    anchor(&mut config.build.client);
    anchor(&mut config.build.server);
    config
}
