//! Route-to-file resolution.
//!
//! Maps a route's logical path to the concrete HTML file the generator wrote
//! under the output root. Two candidates, tried in order:
//!
//! 1. **Direct file**: `<out>/<path>.html`, after normalizing the route path
//!    (one trailing `/` stripped, a trailing `.html` stripped, `.html`
//!    re-appended). The normalization makes `/a/b`, `/a/b/` and `/a/b.html`
//!    all resolve to the same candidate.
//! 2. **Index file**: `<out>/<path>/index.html` — generators that emit
//!    pretty URLs write this shape.
//!
//! If both exist the direct file wins. If neither exists the route is
//! unresolved — the caller reports it and moves on; resolution never fails
//! loudly. Existence is checked with [`Path::is_file`], which folds lookup
//! errors into "not found" — exactly the contract we want for a post-build
//! pass that must not abort a batch over one odd path.

use std::path::{Path, PathBuf};

/// Which candidate won the resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `<out>/<normalized-path>.html`
    Direct,
    /// `<out>/<path>/index.html`
    Index,
}

/// The output file chosen for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub file: PathBuf,
    pub strategy: Strategy,
}

/// Join a route path under the output root.
///
/// Route paths are site-absolute (`/blog/post-1`); the leading slash must be
/// stripped so the join stays inside `out_dir`.
fn join_route(out_dir: &Path, route_path: &str) -> PathBuf {
    out_dir.join(route_path.trim_start_matches('/'))
}

/// Candidate 1: normalized direct file.
pub fn direct_candidate(out_dir: &Path, route_path: &str) -> PathBuf {
    let trimmed = route_path.strip_suffix('/').unwrap_or(route_path);
    let trimmed = trimmed.strip_suffix(".html").unwrap_or(trimmed);
    join_route(out_dir, &format!("{trimmed}.html"))
}

/// Candidate 2: index file under the unmodified route path.
pub fn index_candidate(out_dir: &Path, route_path: &str) -> PathBuf {
    join_route(out_dir, route_path).join("index.html")
}

/// Resolve a route path to an output file, or `None` if neither candidate
/// exists on disk.
pub fn resolve(out_dir: &Path, route_path: &str) -> Option<ResolvedFile> {
    let direct = direct_candidate(out_dir, route_path);
    if direct.is_file() {
        return Some(ResolvedFile {
            file: direct,
            strategy: Strategy::Direct,
        });
    }
    let index = index_candidate(out_dir, route_path);
    if index.is_file() {
        return Some(ResolvedFile {
            file: index,
            strategy: Strategy::Index,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<head></head>").unwrap();
    }

    #[test]
    fn direct_file_resolves() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("blog/post-1.html"));

        let r = resolve(tmp.path(), "/blog/post-1").unwrap();
        assert_eq!(r.strategy, Strategy::Direct);
        assert_eq!(r.file, tmp.path().join("blog/post-1.html"));
    }

    #[test]
    fn index_fallback_resolves() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("docs/intro/index.html"));

        let r = resolve(tmp.path(), "/docs/intro").unwrap();
        assert_eq!(r.strategy, Strategy::Index);
        assert_eq!(r.file, tmp.path().join("docs/intro/index.html"));
    }

    #[test]
    fn direct_wins_over_index_when_both_exist() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("page.html"));
        touch(&tmp.path().join("page/index.html"));

        let r = resolve(tmp.path(), "/page").unwrap();
        assert_eq!(r.strategy, Strategy::Direct);
    }

    #[test]
    fn neither_candidate_yields_none() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(resolve(tmp.path(), "/missing-page"), None);
    }

    #[test]
    fn trailing_slash_is_stripped_for_direct_candidate() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("blog/post-1.html"));

        let r = resolve(tmp.path(), "/blog/post-1/").unwrap();
        assert_eq!(r.strategy, Strategy::Direct);
        assert_eq!(r.file, tmp.path().join("blog/post-1.html"));
    }

    #[test]
    fn html_suffixed_route_normalizes_to_same_candidate() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(
            direct_candidate(tmp.path(), "/a/b.html"),
            direct_candidate(tmp.path(), "/a/b")
        );
    }

    #[test]
    fn root_route_falls_back_to_index() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("index.html"));

        // "/" normalizes to "<out>/.html" for the direct candidate, which
        // never exists; the index candidate picks up the homepage.
        let r = resolve(tmp.path(), "/").unwrap();
        assert_eq!(r.strategy, Strategy::Index);
        assert_eq!(r.file, tmp.path().join("index.html"));
    }

    #[test]
    fn index_candidate_uses_unmodified_path() {
        let out = Path::new("/out");
        assert_eq!(
            index_candidate(out, "/docs/intro"),
            PathBuf::from("/out/docs/intro/index.html")
        );
    }
}
