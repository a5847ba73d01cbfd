//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use strata_core::SiteConfig;

use crate::config::{self, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// Site configuration, with directories anchored at the project root.
    pub config: SiteConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Directory holding the config file, or the working directory.
    pub root: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let found = match config_path {
            Some(path) => {
                let path = resolve(&cwd, path);
                Some((config::load(&path)?, path))
            }
            None => Self::find_config(&cwd)?,
        };

        let (config, root) = match found {
            Some((config, path)) => {
                output.debug(&format!("Using config {}", path.display()));
                let root = path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.clone());
                (config, root)
            }
            None => (SiteConfig::default(), cwd.clone()),
        };

        Ok(Self {
            config: config::rooted(config, &root),
            output,
            cwd,
            root,
        })
    }

    /// Find config file in directory tree.
    ///
    /// The nearest config file wins. A file that exists but fails to parse
    /// is an error rather than a reason to keep searching.
    fn find_config(start: &Path) -> Result<Option<(SiteConfig, PathBuf)>> {
        let mut current = start.to_path_buf();
        loop {
            for name in CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    let config = config::load(&config_path)?;
                    return Ok(Some((config, config_path)));
                }
            }

            if !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        resolve(&self.cwd, path)
    }
}

fn resolve(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_searches_upward() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("strata.toml"), "out_dir = \"public\"").unwrap();
        let nested = dir.path().join("src").join("pages");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, path) = Context::find_config(&nested).unwrap().unwrap();
        assert_eq!(config.out_dir, PathBuf::from("public"));
        assert_eq!(path, dir.path().join("strata.toml"));
    }

    #[test]
    fn test_find_config_prefers_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("strata.toml"), "out_dir = \"toml\"").unwrap();
        std::fs::write(dir.path().join("strata.json"), r#"{ "out_dir": "json" }"#).unwrap();

        let (config, _) = Context::find_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.out_dir, PathBuf::from("toml"));
    }

    #[test]
    fn test_find_config_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("strata.toml"), "out_dir = \"public\"\n[build\n").unwrap();
        std::fs::write(dir.path().join("strata.json"), r#"{ "out_dir": "json" }"#).unwrap();

        let err = Context::find_config(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("strata.toml"));
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(resolve(Path::new("/work"), "plan.json"), PathBuf::from("/work/plan.json"));
        assert_eq!(resolve(Path::new("/work"), "/abs/plan.json"), PathBuf::from("/abs/plan.json"));
    }
}
