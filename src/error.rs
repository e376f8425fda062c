//! Error types for host-side loading and render-context access.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Failures while loading snapshots or the site map from disk.
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid snapshot {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid site map {}: {message}", path.display())]
    SiteMap { path: PathBuf, message: String },
    #[error("bad snapshot pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
/// Rule-local failures reading the rendered document. Rules recover from
/// these by skipping the affected element or stylesheet.
pub enum ContextError {
    #[error("computed style unavailable for {0}")]
    StyleUnavailable(String),
    #[error("stylesheet {0} is not readable (cross-origin)")]
    CrossOrigin(String),
}
