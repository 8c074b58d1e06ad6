//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve URL to filesystem path, handling index.html for directories
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject paths with suspicious patterns early
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let local = serve_root.join(&clean);

    // Symlinks and encoded sequences must still land under serve_root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Path part of a request URL.
pub fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Normalize URL: strip query string, decode, trim slashes
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;
    let decoded = percent_decode_str(strip_query(url))
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    decoded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dist/docs")).unwrap();
        fs::write(dir.path().join("dist/index.html"), "home").unwrap();
        fs::write(dir.path().join("dist/docs/index.html"), "docs").unwrap();
        fs::write(dir.path().join("dist/my page.html"), "spaced").unwrap();
        fs::write(dir.path().join("secret.txt"), "no").unwrap();
        dir
    }

    #[test]
    fn test_directories_map_to_index() {
        let dir = site();
        let root = dir.path().join("dist");
        let home = resolve_path("/", &root).unwrap();
        assert!(home.ends_with("dist/index.html"));
        let docs = resolve_path("/docs/?tab=1", &root).unwrap();
        assert!(docs.ends_with("docs/index.html"));
    }

    #[test]
    fn test_percent_decoding() {
        let dir = site();
        let root = dir.path().join("dist");
        assert!(resolve_path("/my%20page.html", &root).is_some());
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = site();
        let root = dir.path().join("dist");
        assert!(resolve_path("/../secret.txt", &root).is_none());
        assert!(resolve_path("/%2e%2e/secret.txt", &root).is_none());
        assert!(resolve_path("/missing.css", &root).is_none());
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("/__kiln/livereload.js?v=1"), "/__kiln/livereload.js");
        assert_eq!(strip_query("/a#top"), "/a");
    }
}
