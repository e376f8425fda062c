//! Site map schema: the known route table and the navigation-link registry
//! the host application renders.

use crate::error::LoadError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
/// Top-level site map loaded from TOML.
pub struct SiteMap {
    #[serde(default)]
    pub routes: Vec<String>,
    #[serde(default)]
    pub nav: Vec<NavSection>,
}

#[derive(Debug, Clone, Deserialize)]
/// A titled group of navigation links.
pub struct NavSection {
    pub section: String,
    #[serde(default)]
    pub links: Vec<NavLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavLink {
    pub title: String,
    pub href: String,
}

impl SiteMap {
    pub fn load(path: &Path) -> Result<SiteMap, LoadError> {
        let s = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&s).map_err(|e| LoadError::SiteMap {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Whether `href` resolves to a known route after stripping query and
    /// fragment. The root path is always valid.
    pub fn is_known(&self, href: &str) -> bool {
        let path = strip_query(href);
        path == "/" || self.routes.iter().any(|r| r == path)
    }

    /// Iterate `(section, link)` pairs in declaration order.
    pub fn links(&self) -> impl Iterator<Item = (&str, &NavLink)> {
        self.nav
            .iter()
            .flat_map(|s| s.links.iter().map(move |l| (s.section.as_str(), l)))
    }
}

/// Drop `?query` and `#fragment` from an href.
pub fn strip_query(href: &str) -> &str {
    let end = href.find(|c: char| c == '?' || c == '#').unwrap_or(href.len());
    &href[..end]
}
