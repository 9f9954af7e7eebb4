//! Shared test utilities for the ogstamp test suite.
//!
//! Builds throwaway output directories — the generator's emitted site — in
//! temp dirs, plus small constructors for the route values tests pass
//! around constantly.
//!
//! ```rust
//! let tmp = site_with_pages(&[("blog/post-1.html", "<head></head><body></body>")]);
//! let routes = vec![route("/blog/post-1", "docusaurus-plugin-content-blog")];
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::routes::TaggedRoute;

/// Create a temp output directory containing the given HTML files.
///
/// Paths are relative to the directory root; parent directories are created
/// as needed. Tests get an isolated tree they can mutate freely.
pub fn site_with_pages(pages: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (rel_path, content) in pages {
        write_page(tmp.path(), rel_path, content);
    }
    tmp
}

/// Write one HTML file under an output root.
pub fn write_page(out_dir: &Path, rel_path: &str, content: &str) {
    let path = out_dir.join(rel_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
}

/// An eligible route with no extra generator metadata.
pub fn route(path: &str, plugin_name: &str) -> TaggedRoute {
    TaggedRoute {
        path: path.to_string(),
        plugin_name: plugin_name.to_string(),
        extra: serde_json::Map::new(),
    }
}
