//! Route model and eligibility filtering.
//!
//! The host site generator hands over its emitted routes as a JSON manifest:
//! a list of sub-generator descriptors, each carrying a plugin name and the
//! routes that plugin produced. This module loads that manifest and selects
//! the routes ogstamp is allowed to touch.
//!
//! ## Manifest Shape
//!
//! ```json
//! [
//!   {
//!     "name": "docusaurus-plugin-content-blog",
//!     "routes": [
//!       { "path": "/blog/post-1", "component": "@theme/BlogPostPage" }
//!     ]
//!   }
//! ]
//! ```
//!
//! Fields beyond `path` are generator metadata — carried through opaquely,
//! never interpreted.
//!
//! ## Eligibility
//!
//! A plugin's routes are included iff its name is in the recognized
//! allow-list AND in the user's enabled set. Unrecognized plugin names are
//! silently excluded — the generator is free to run plugins this tool has
//! never heard of. Ordering is preserved: plugins in manifest order, routes
//! in plugin order.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sub-generators whose routes this tool knows how to process.
pub const RECOGNIZED_PLUGINS: &[&str] = &[
    "docusaurus-plugin-content-docs",
    "docusaurus-plugin-content-pages",
    "docusaurus-plugin-content-blog",
];

#[derive(Error, Debug)]
pub enum RoutesError {
    #[error("failed to read routes manifest {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse routes manifest {0}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),
}

/// One sub-generator descriptor from the routes manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginRoutes {
    pub name: String,
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// A logical page entry as emitted by the generator.
///
/// Routes without a `path` are representable (some generators emit parent
/// entries with no page of their own) — the orchestrator skips them.
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub path: String,
    /// Generator metadata (component, exact flag, ...) — opaque pass-through.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An eligible route, flattened and tagged with its originating plugin.
#[derive(Debug, Clone)]
pub struct TaggedRoute {
    pub path: String,
    pub plugin_name: String,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Load a routes manifest from disk.
pub fn load_manifest(path: &Path) -> Result<Vec<PluginRoutes>, RoutesError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| RoutesError::Io(path.to_path_buf(), e))?;
    serde_json::from_str(&content).map_err(|e| RoutesError::Json(path.to_path_buf(), e))
}

/// Resolve the effective enabled set: the user's list, or all recognized
/// plugins when the user didn't constrain it.
pub fn effective_enabled(user: Option<&[String]>) -> Vec<String> {
    match user {
        Some(list) => list.to_vec(),
        None => RECOGNIZED_PLUGINS.iter().map(|s| s.to_string()).collect(),
    }
}

/// Select eligible routes: recognized ∩ enabled, order preserved.
///
/// Pure selection — no I/O, no diagnostics. A plugin with no routes
/// contributes nothing; an unrecognized name is not an error.
pub fn eligible_routes(plugins: Vec<PluginRoutes>, enabled: &[String]) -> Vec<TaggedRoute> {
    plugins
        .into_iter()
        .filter(|plugin| {
            RECOGNIZED_PLUGINS.contains(&plugin.name.as_str())
                && enabled.iter().any(|e| e == &plugin.name)
        })
        .flat_map(|plugin| {
            let name = plugin.name;
            plugin
                .routes
                .into_iter()
                .map(move |route| TaggedRoute {
                    path: route.path,
                    plugin_name: name.clone(),
                    extra: route.extra,
                })
        })
        .collect()
}
