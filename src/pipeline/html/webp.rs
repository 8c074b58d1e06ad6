//! Wrap raster `<img>` tags in `<picture>` with a WebP source.
//!
//! ```html
//! <img src="img/a.jpg" alt="">
//! <!-- becomes -->
//! <picture><source srcset="img/a.webp" type="image/webp"><img src="img/a.jpg" alt=""></picture>
//! ```
//!
//! Images already inside a `<picture>` are left alone.

use std::sync::LazyLock;

use regex::Regex;

static TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<picture\b[^>]*>|</picture\s*>|<img\b[^>]*>").expect("valid tag regex")
});

static SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid src regex")
});

/// `img/a.jpg?v=2` -> `img/a.webp?v=2`, `None` for non-raster sources.
pub fn webp_url(url: &str) -> Option<String> {
    if url.starts_with("data:") {
        return None;
    }
    let split = url.find(['?', '#']).unwrap_or(url.len());
    let (path, suffix) = url.split_at(split);
    let lower = path.to_ascii_lowercase();
    let stem_len = [".jpg", ".jpeg", ".png"]
        .iter()
        .find(|ext| lower.ends_with(*ext))
        .map(|ext| path.len() - ext.len())?;
    Some(format!("{}.webp{}", &path[..stem_len], suffix))
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len() && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

pub fn rewrite(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + html.len() / 8);
    let mut last = 0;
    let mut picture_depth = 0usize;

    for tag in TAGS.find_iter(html) {
        let text = tag.as_str();
        if starts_with_ignore_case(text, "<picture") {
            picture_depth += 1;
            continue;
        }
        if starts_with_ignore_case(text, "</picture") {
            picture_depth = picture_depth.saturating_sub(1);
            continue;
        }
        if picture_depth > 0 {
            continue;
        }

        let Some(webp) = SRC
            .captures(text)
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .and_then(|src| webp_url(src.as_str()))
        else {
            continue;
        };

        out.push_str(&html[last..tag.start()]);
        out.push_str("<picture><source srcset=\"");
        out.push_str(&webp);
        out.push_str("\" type=\"image/webp\">");
        out.push_str(text);
        out.push_str("</picture>");
        last = tag.end();
    }

    out.push_str(&html[last..]);
    out
}
