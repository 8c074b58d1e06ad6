//! Local `@import` inlining.
//!
//! ```css
//! @import "base.css";                 /* inlined */
//! @import url(print.css) print;       /* inlined inside @media print */
//! @import url("https://fonts/x.css"); /* kept, moved to the top */
//! ```
//!
//! Each file is inlined at most once per bundle.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*@import\s+(?:url\(\s*(?:"([^"]*)"|'([^']*)'|([^)\s]*))\s*\)|"([^"]*)"|'([^']*)')\s*([^;]*);[ \t]*\r?\n?"#,
    )
    .expect("valid import regex")
});

pub fn is_remote(url: &str) -> bool {
    url.starts_with("http:") || url.starts_with("https:") || url.starts_with("//")
}

/// Bundle `entries` (in order) into a single stylesheet.
pub fn bundle(entries: &[PathBuf]) -> Result<String> {
    let mut state = Bundle::default();
    let mut body = String::new();
    for entry in entries {
        body.push_str(&state.inline(entry)?);
        if !body.ends_with('\n') {
            body.push('\n');
        }
    }

    if state.remote.is_empty() {
        return Ok(body);
    }
    let mut out = state.remote.join("\n");
    out.push('\n');
    out.push_str(&body);
    Ok(out)
}

#[derive(Default)]
struct Bundle {
    seen: Vec<PathBuf>,
    remote: Vec<String>,
}

impl Bundle {
    fn inline(&mut self, path: &Path) -> Result<String> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if self.seen.contains(&key) {
            return Ok(String::new());
        }
        self.seen.push(key);

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let base = path.parent().unwrap_or(Path::new("."));

        let mut out = String::with_capacity(content.len());
        let mut last = 0;
        for caps in IMPORT.captures_iter(&content) {
            let Some(whole) = caps.get(0) else { continue };
            let url = (1..=5)
                .find_map(|i| caps.get(i))
                .map(|m| m.as_str())
                .unwrap_or_default();
            let media = caps.get(6).map_or("", |m| m.as_str()).trim();

            out.push_str(&content[last..whole.start()]);
            last = whole.end();

            if is_remote(url) {
                self.remote.push(whole.as_str().trim().to_string());
                continue;
            }

            let target = base.join(url);
            let mut inlined = self
                .inline(&target)
                .with_context(|| format!("@import \"{url}\" in {}", path.display()))?;
            if !inlined.ends_with('\n') {
                inlined.push('\n');
            }
            if media.is_empty() {
                out.push_str(&inlined);
            } else {
                out.push_str(&format!("@media {media} {{\n{inlined}}}\n"));
            }
        }
        out.push_str(&content[last..]);
        Ok(out)
    }
}
