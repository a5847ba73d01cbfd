//! Error taxonomy for a single render.

use std::path::PathBuf;

/// Error type for render and generation operations.
///
/// Every variant is fatal to the path being rendered and to nothing else.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Cannot find the built path for {specifier}")]
    Resolution { specifier: String },

    #[error("Unsupported output: {0}")]
    UnsupportedOutput(String),

    #[error("Contract violation: {0}")]
    ContractViolation(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Streaming error: {0}")]
    Stream(String),

    #[error("Unable to find the module for {0}")]
    ModuleNotFound(String),

    #[error("Renderer error: {0}")]
    Renderer(String),

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl RenderError {
    /// Create a resolution error for a specifier.
    pub fn resolution(specifier: impl Into<String>) -> Self {
        Self::Resolution {
            specifier: specifier.into(),
        }
    }

    /// Wrap an I/O error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_message_names_specifier() {
        let err = RenderError::resolution("/src/components/Counter.jsx");
        assert_eq!(
            err.to_string(),
            "Cannot find the built path for /src/components/Counter.jsx"
        );
    }

    #[test]
    fn test_io_message_names_path() {
        let err = RenderError::io(
            "dist/about/index.html",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("dist/about/index.html"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_collaborator_is_transparent() {
        let err: RenderError = anyhow::anyhow!("endpoint blew up").into();
        assert_eq!(err.to_string(), "endpoint blew up");
    }
}
