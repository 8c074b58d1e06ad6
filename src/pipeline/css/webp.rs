//! `.webp` rule variants for raster backgrounds.
//!
//! ```css
//! .hero { color: red; background: url(../img/hero.jpg) center; }
//! /* gains */
//! .webp .hero{background: url(../img/hero.webp) center;}
//! ```
//!
//! A WebP feature-detection script adds the `webp` class to `<html>`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::pipeline::html::webp_url;

/// Innermost `selector { declarations }` blocks.
static BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^{}]*)\{([^{}]*)\}").expect("valid block regex"));

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(["']?)([^"')]+)(["']?)\s*\)"#).expect("valid url regex")
});

pub fn rewrite(css: &str) -> String {
    BLOCK
        .replace_all(css, |caps: &Captures| {
            let whole = &caps[0];
            match webp_rule(&caps[1], &caps[2]) {
                Some(extra) => format!("{whole}\n{extra}"),
                None => whole.to_string(),
            }
        })
        .into_owned()
}

fn webp_rule(prelude: &str, body: &str) -> Option<String> {
    // Drop anything before the selector (comments, `;`-terminated statements)
    let selector = prelude
        .rsplit_once(';')
        .map_or(prelude, |(_, tail)| tail);
    let selector = selector
        .rsplit_once("*/")
        .map_or(selector, |(_, tail)| tail)
        .trim();
    if selector.is_empty() || selector.starts_with('@') || is_keyframe_step(selector) {
        return None;
    }

    let declarations: Vec<String> = body
        .split(';')
        .filter_map(|decl| {
            let mut changed = false;
            let rewritten = URL.replace_all(decl, |c: &Captures| match webp_url(&c[2]) {
                Some(url) => {
                    changed = true;
                    format!("url({}{}{})", &c[1], url, &c[3])
                }
                None => c[0].to_string(),
            });
            changed.then(|| rewritten.trim().to_string())
        })
        .collect();
    if declarations.is_empty() {
        return None;
    }

    let selectors: Vec<String> = selector
        .split(',')
        .map(|s| format!(".webp {}", s.trim()))
        .collect();
    Some(format!("{}{{{};}}", selectors.join(", "), declarations.join(";")))
}

fn is_keyframe_step(selector: &str) -> bool {
    selector
        .split(',')
        .all(|s| matches!(s.trim(), "from" | "to") || s.trim().ends_with('%'))
}
