//! Glob patterns for the path registry.
//!
//! Patterns are written relative to the project root with `/` separators,
//! the same way they appear in `kiln.toml`:
//!
//! ```text
//! src/*.html              one level
//! src/img/**/*.{jpg,png}  any depth, alternatives
//! !src/_*.html            exclusion (only inside a GlobSet)
//! ```
//!
//! Each pattern compiles to an anchored regex. The literal directory prefix
//! (`src/img` above) is kept as the walk base, so expansion only visits the
//! part of the tree that can match.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlobError {
    #[error("invalid glob `{pattern}`: {reason}")]
    Invalid { pattern: String, reason: String },
}

impl GlobError {
    fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// A single compiled pattern.
#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    regex: Regex,
    base: PathBuf,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self, GlobError> {
        let pattern = pattern.trim().trim_start_matches("./");
        if pattern.is_empty() {
            return Err(GlobError::invalid(pattern, "empty pattern"));
        }
        let source = translate(pattern)?;
        let regex = Regex::new(&source).map_err(|e| GlobError::invalid(pattern, e.to_string()))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            base: literal_base(pattern),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Directory (relative to the root) that contains every possible match.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Match a `/`-separated path relative to the root.
    pub fn is_match(&self, relative: &str) -> bool {
        self.regex.is_match(relative)
    }
}

/// Include/exclude pattern list, evaluated like the original `["a", "!b"]`
/// arrays: a path matches when any include matches and no exclude does.
#[derive(Debug, Clone, Default)]
pub struct GlobSet {
    include: Vec<Glob>,
    exclude: Vec<Glob>,
}

impl GlobSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, GlobError> {
        let mut set = Self::default();
        for raw in patterns {
            let raw = raw.as_ref().trim();
            match raw.strip_prefix('!') {
                Some(negated) => set.exclude.push(Glob::new(negated)?),
                None => set.include.push(Glob::new(raw)?),
            }
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty()
    }

    /// Original pattern strings, exclusions prefixed with `!`.
    pub fn patterns(&self) -> Vec<String> {
        self.include
            .iter()
            .map(|g| g.as_str().to_string())
            .chain(self.exclude.iter().map(|g| format!("!{}", g.as_str())))
            .collect()
    }

    /// Match a `/`-separated relative path.
    pub fn is_match(&self, relative: &str) -> bool {
        self.include.iter().any(|g| g.is_match(relative))
            && !self.exclude.iter().any(|g| g.is_match(relative))
    }

    /// Match an absolute (or root-relative) filesystem path.
    pub fn matches_path(&self, path: &Path, root: &Path) -> bool {
        relative_str(path, root).is_some_and(|rel| self.is_match(&rel))
    }

    /// Walk the base directories under `root` and return matching files,
    /// sorted and deduplicated.
    pub fn expand(&self, root: &Path) -> Vec<PathBuf> {
        let mut bases: Vec<&Path> = self.include.iter().map(Glob::base).collect();
        bases.sort();
        bases.dedup();

        let mut files: Vec<PathBuf> = bases
            .into_iter()
            .map(|base| root.join(base))
            .filter(|dir| dir.is_dir())
            .flat_map(|dir| {
                WalkDir::new(dir)
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.path())
            })
            .filter(|path| self.matches_path(path, root))
            .collect();

        files.sort();
        files.dedup();
        files
    }

    /// Walk base of the first include pattern matching `path`, the directory
    /// outputs are mirrored from.
    pub fn base_for(&self, path: &Path, root: &Path) -> Option<PathBuf> {
        let rel = relative_str(path, root)?;
        self.include
            .iter()
            .find(|g| g.is_match(&rel))
            .map(|g| root.join(g.base()))
    }

    /// Directories that must be watched to observe every match.
    pub fn watch_roots(&self, root: &Path) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self.include.iter().map(|g| root.join(g.base())).collect();
        roots.sort();
        roots.dedup();
        roots
    }
}

/// `root/a/b.css` -> `a/b.css`
pub fn relative_str(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

fn has_meta(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

/// Longest literal directory prefix of a pattern.
fn literal_base(pattern: &str) -> PathBuf {
    let segments: Vec<&str> = pattern.split('/').collect();
    let literal = segments.iter().take_while(|s| !has_meta(s)).count();
    // A fully literal pattern names a file; its parent is the base.
    let take = if literal == segments.len() {
        literal - 1
    } else {
        literal
    };
    segments[..take].iter().collect()
}

/// Translate glob syntax into an anchored regex.
fn translate(pattern: &str) -> Result<String, GlobError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^");
    let mut brace_depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '*' if chars.get(i + 1) == Some(&'*') => {
                let at_segment_start = i == 0 || chars[i - 1] == '/';
                let followed_by_slash = chars.get(i + 2) == Some(&'/');
                if at_segment_start && followed_by_slash {
                    // `**/` matches zero or more directories
                    out.push_str("(?:[^/]*/)*");
                    i += 3;
                } else {
                    out.push_str(".*");
                    i += 2;
                }
                continue;
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '{' => {
                brace_depth += 1;
                out.push_str("(?:");
            }
            '}' if brace_depth > 0 => {
                brace_depth -= 1;
                out.push(')');
            }
            ',' if brace_depth > 0 => out.push('|'),
            '[' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == ']')
                    .ok_or_else(|| GlobError::invalid(pattern, "unclosed `[`"))?;
                let body: String = chars[i + 1..i + 1 + close].iter().collect();
                let body = match body.strip_prefix('!') {
                    Some(rest) => format!("^{rest}"),
                    None => body,
                };
                out.push('[');
                out.push_str(&body.replace('\\', "\\\\"));
                out.push(']');
                i += close + 2;
                continue;
            }
            _ => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    if brace_depth > 0 {
        return Err(GlobError::invalid(pattern, "unclosed `{`"));
    }
    out.push('$');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_single_star_stays_in_segment() {
        let g = Glob::new("src/*.html").unwrap();
        assert!(g.is_match("src/index.html"));
        assert!(!g.is_match("src/pages/about.html"));
        assert!(!g.is_match("src/index.htm"));
    }

    #[test]
    fn test_double_star_any_depth() {
        let g = Glob::new("src/**/*.html").unwrap();
        assert!(g.is_match("src/index.html"));
        assert!(g.is_match("src/a/b/c.html"));
        assert!(!g.is_match("other/index.html"));
    }

    #[test]
    fn test_base_for() {
        let set = GlobSet::new(&["src/img/**/*.png", "src/css/style.css"]).unwrap();
        let root = Path::new("/site");
        assert_eq!(
            set.base_for(Path::new("/site/src/img/icons/a.png"), root),
            Some(PathBuf::from("/site/src/img"))
        );
        assert_eq!(
            set.base_for(Path::new("/site/src/css/style.css"), root),
            Some(PathBuf::from("/site/src/css"))
        );
        assert_eq!(set.base_for(Path::new("/site/other.png"), root), None);
    }

    #[test]
    fn test_braces() {
        let g = Glob::new("src/img/**/*.{jpg,png,svg}").unwrap();
        assert!(g.is_match("src/img/a.jpg"));
        assert!(g.is_match("src/img/icons/b.svg"));
        assert!(!g.is_match("src/img/c.gif"));
    }

    #[test]
    fn test_character_class() {
        let g = Glob::new("src/[ab].css").unwrap();
        assert!(g.is_match("src/a.css"));
        assert!(!g.is_match("src/c.css"));

        let negated = Glob::new("src/[!ab].css").unwrap();
        assert!(negated.is_match("src/c.css"));
        assert!(!negated.is_match("src/a.css"));
    }

    #[test]
    fn test_literal_dots_are_escaped() {
        let g = Glob::new("src/css/style.css").unwrap();
        assert!(g.is_match("src/css/style.css"));
        assert!(!g.is_match("src/css/styleXcss"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(Glob::new("src/{a,b").is_err());
        assert!(Glob::new("src/[ab").is_err());
        assert!(Glob::new("").is_err());
    }

    #[test]
    fn test_literal_base() {
        assert_eq!(Glob::new("src/*.html").unwrap().base(), Path::new("src"));
        assert_eq!(
            Glob::new("src/img/**/*.png").unwrap().base(),
            Path::new("src/img")
        );
        assert_eq!(
            Glob::new("src/css/style.css").unwrap().base(),
            Path::new("src/css")
        );
        assert_eq!(Glob::new("*.html").unwrap().base(), Path::new(""));
    }

    #[test]
    fn test_set_exclusion() {
        let set = GlobSet::new(&["src/*.html", "!src/_*.html"]).unwrap();
        assert!(set.is_match("src/index.html"));
        assert!(!set.is_match("src/_header.html"));
        assert_eq!(set.patterns(), vec!["src/*.html", "!src/_*.html"]);
    }

    #[test]
    fn test_expand_walks_base_only() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/img/icons")).unwrap();
        fs::write(root.join("src/img/a.png"), b"").unwrap();
        fs::write(root.join("src/img/icons/b.svg"), b"").unwrap();
        fs::write(root.join("src/img/notes.txt"), b"").unwrap();
        fs::write(root.join("src/index.html"), b"").unwrap();

        let set = GlobSet::new(&["src/img/**/*.{png,svg}"]).unwrap();
        let files = set.expand(root);
        assert_eq!(
            files,
            vec![root.join("src/img/a.png"), root.join("src/img/icons/b.svg")]
        );
    }

    #[test]
    fn test_expand_missing_base() {
        let dir = TempDir::new().unwrap();
        let set = GlobSet::new(&["src/js/*.js"]).unwrap();
        assert!(set.expand(dir.path()).is_empty());
    }

    #[test]
    fn test_relative_str() {
        let root = Path::new("/project");
        assert_eq!(
            relative_str(Path::new("/project/src/a.css"), root).as_deref(),
            Some("src/a.css")
        );
        assert_eq!(relative_str(Path::new("/elsewhere/a.css"), root), None);
    }
}
