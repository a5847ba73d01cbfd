//! Specifier resolution and bundler facade helpers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use strata_core::{RenderError, ResolveSpecifier};

use crate::internals::EntrySpecifierMap;

/// Resolves specifiers for one output path.
///
/// Bundled specifiers resolve to a path relative to the output path.
/// Optional specifiers missing from the build resolve to their placeholder.
#[derive(Debug, Clone)]
pub struct SpecifierResolver {
    entries: Arc<EntrySpecifierMap>,
    optional: Arc<BTreeMap<String, String>>,
    pathname: String,
}

impl SpecifierResolver {
    /// Create a resolver bound to `pathname`.
    pub fn new(
        entries: Arc<EntrySpecifierMap>,
        optional: Arc<BTreeMap<String, String>>,
        pathname: impl Into<String>,
    ) -> Self {
        Self {
            entries,
            optional,
            pathname: pathname.into(),
        }
    }
}

impl ResolveSpecifier for SpecifierResolver {
    fn resolve(&self, specifier: &str) -> Result<String, RenderError> {
        match self.entries.get(specifier) {
            Some(hashed) => {
                let rel = relative_posix(&self.pathname, &format!("/{hashed}"));
                if rel.starts_with('.') {
                    Ok(rel)
                } else {
                    Ok(format!("./{rel}"))
                }
            }
            None => self
                .optional
                .get(specifier)
                .cloned()
                .ok_or_else(|| RenderError::resolution(specifier)),
        }
    }
}

fn segments(path: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Relative path from directory `from` to `to`, both absolute posix paths.
pub fn relative_posix(from: &str, to: &str) -> String {
    let from = segments(from);
    let to = segments(to);
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend(&to[common..]);
    parts.join("/")
}

/// Strip the project root from an absolute module id.
///
/// `/home/me/site/src/pages/index.astro` -> `src/pages/index.astro`.
pub fn root_relative_facade_id(facade_id: &str, root: &str) -> String {
    facade_id
        .strip_prefix(root)
        .unwrap_or(facade_id)
        .to_string()
}

fn prepend_forward_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// One unit of bundler output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleOutput {
    /// A code chunk, optionally the facade of an entry module.
    Chunk { facade_module_id: Option<String> },
    /// A static asset.
    Asset { file_name: String },
}

/// Check whether a bundler output unit is a page entry.
pub fn chunk_is_page(root: &str, output: &BundleOutput, entries: &EntrySpecifierMap) -> bool {
    match output {
        BundleOutput::Chunk {
            facade_module_id: Some(facade_id),
        } => {
            let id = root_relative_facade_id(facade_id, root).replace('\\', "/");
            entries.contains(&prepend_forward_slash(&id))
        }
        _ => false,
    }
}

/// Look up a value by module id, falling back to the backslash-separated form.
pub fn get_by_facade_id<'a, T>(facade_id: &str, map: &'a HashMap<String, T>) -> Option<&'a T> {
    map.get(facade_id)
        .or_else(|| map.get(&facade_id.replace('/', "\\")))
}
