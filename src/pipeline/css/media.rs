//! Media-query grouping.
//!
//! Top-level `@media` blocks with the same query are merged and moved to the
//! end of the sheet, mobile-first:
//!
//! 1. `min-width` queries, ascending
//! 2. `max-width` queries, descending
//! 3. everything else, in order of first appearance

use std::cmp::Ordering;
use std::sync::LazyLock;

use lightningcss::rules::CssRule;
use lightningcss::rules::media::MediaRule;
use lightningcss::stylesheet::{PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;
use regex::Regex;

// lightningcss may print either `min-width: X` or the range form `width >= X`
static MIN_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:only\s+screen\s+and\s+|screen\s+and\s+)?\((?:min-width\s*:|width\s*>=)\s*([\d.]+)(px|em|rem)?\)$")
        .expect("valid min-width regex")
});

static MAX_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:only\s+screen\s+and\s+|screen\s+and\s+)?\((?:max-width\s*:|width\s*<=)\s*([\d.]+)(px|em|rem)?\)$")
        .expect("valid max-width regex")
});

#[derive(Debug, Clone, Copy, PartialEq)]
enum QueryKind {
    Min(f64),
    Max(f64),
    Other,
}

fn pixels(value: &str, unit: Option<&str>) -> f64 {
    let n: f64 = value.parse().unwrap_or(0.0);
    match unit {
        Some("em" | "rem") => n * 16.0,
        _ => n,
    }
}

fn classify(query: &str) -> QueryKind {
    let query = query.trim();
    if let Some(c) = MIN_WIDTH.captures(query) {
        return QueryKind::Min(pixels(&c[1], c.get(2).map(|m| m.as_str())));
    }
    if let Some(c) = MAX_WIDTH.captures(query) {
        return QueryKind::Max(pixels(&c[1], c.get(2).map(|m| m.as_str())));
    }
    QueryKind::Other
}

fn compare(a: QueryKind, b: QueryKind) -> Ordering {
    use QueryKind::*;
    match (a, b) {
        (Min(x), Min(y)) => x.total_cmp(&y),
        (Max(x), Max(y)) => y.total_cmp(&x),
        (Min(_), _) => Ordering::Less,
        (_, Min(_)) => Ordering::Greater,
        (Max(_), Other) => Ordering::Less,
        (Other, Max(_)) => Ordering::Greater,
        (Other, Other) => Ordering::Equal,
    }
}

/// Sort order of a set of query strings (stable for `Other`).
pub fn sorted_queries(queries: &[String]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..queries.len()).collect();
    order.sort_by(|&a, &b| compare(classify(&queries[a]), classify(&queries[b])));
    order
}

/// Merge and reorder top-level `@media` rules in place.
pub fn group_media_queries(sheet: &mut StyleSheet) {
    let rules = std::mem::take(&mut sheet.rules.0);
    let mut kept = Vec::with_capacity(rules.len());
    let mut queries: Vec<String> = Vec::new();
    let mut groups: Vec<MediaRule> = Vec::new();

    for rule in rules {
        match rule {
            CssRule::Media(media) => {
                let Ok(query) = media.query.to_css_string(PrinterOptions::default()) else {
                    kept.push(CssRule::Media(media));
                    continue;
                };
                match queries.iter().position(|q| *q == query) {
                    Some(i) => groups[i].rules.0.extend(media.rules.0),
                    None => {
                        queries.push(query);
                        groups.push(media);
                    }
                }
            }
            other => kept.push(other),
        }
    }

    let mut slots: Vec<Option<MediaRule>> = groups.into_iter().map(Some).collect();
    for i in sorted_queries(&queries) {
        if let Some(media) = slots[i].take() {
            kept.push(CssRule::Media(media));
        }
    }
    sheet.rules.0 = kept;
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightningcss::stylesheet::ParserOptions;

    fn group(css: &str) -> String {
        let mut sheet = StyleSheet::parse(css, ParserOptions::default()).unwrap();
        group_media_queries(&mut sheet);
        sheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .unwrap()
            .code
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("(min-width: 768px)"), QueryKind::Min(768.0));
        assert_eq!(classify("(width >= 48em)"), QueryKind::Min(768.0));
        assert_eq!(classify("screen and (max-width: 600px)"), QueryKind::Max(600.0));
        assert_eq!(classify("print"), QueryKind::Other);
    }

    #[test]
    fn test_sorted_queries() {
        let q: Vec<String> = [
            "print",
            "(max-width: 600px)",
            "(min-width: 1024px)",
            "(max-width: 900px)",
            "(min-width: 768px)",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(sorted_queries(&q), vec![4, 2, 3, 1, 0]);
    }

    #[test]
    fn test_merges_identical_queries_and_moves_them_last() {
        let out = group(
            "@media (min-width: 768px){.a{color:red}}\n.b{color:blue}\n@media (min-width: 768px){.c{color:green}}",
        );
        assert_eq!(out.matches("@media").count(), 1);
        let b = out.find(".b").unwrap();
        let media = out.find("@media").unwrap();
        assert!(b < media);
        assert!(out.find(".a").unwrap() < out.find(".c").unwrap());
    }
}
