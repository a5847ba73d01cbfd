//! Generation report.

use std::path::PathBuf;

use serde::Serialize;

use crate::internals::PageBuildData;

/// What happened to one output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOutcome {
    /// The file was written.
    Written(PathBuf),
    /// The render produced a non-HTML result; nothing was written.
    Skipped,
    /// The render failed; nothing was written.
    Failed(String),
}

/// A path that failed to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPath {
    /// Output path.
    pub pathname: String,
    /// Page component.
    pub component: String,
    /// Error message.
    pub error: String,
}

/// Summary of a generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    /// Page (not endpoint) paths, normalized for display.
    pub page_names: Vec<String>,
    /// Files written.
    pub written: Vec<PathBuf>,
    /// Paths skipped because they did not render to HTML.
    pub skipped: Vec<String>,
    /// Paths that failed.
    pub failed: Vec<FailedPath>,
}

impl GenerationReport {
    /// Record the outcome of one path.
    pub fn record(&mut self, page: &PageBuildData, pathname: &str, outcome: PathOutcome) {
        if page.route.is_page() {
            self.page_names.push(page_name(pathname));
        }
        match outcome {
            PathOutcome::Written(file) => self.written.push(file),
            PathOutcome::Skipped => self.skipped.push(pathname.to_string()),
            PathOutcome::Failed(error) => self.failed.push(FailedPath {
                pathname: pathname.to_string(),
                component: page.component.clone(),
                error,
            }),
        }
    }

    /// Number of paths processed.
    pub fn total(&self) -> usize {
        self.written.len() + self.skipped.len() + self.failed.len()
    }

    /// Check if any path failed.
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Normalize a path for the page list: trailing slash, no leading slash.
pub fn page_name(pathname: &str) -> String {
    let with_slash = if pathname.ends_with('/') {
        pathname.to_string()
    } else {
        format!("{pathname}/")
    };
    with_slash
        .strip_prefix('/')
        .map(str::to_string)
        .unwrap_or(with_slash)
}
