//! Whitespace-collapsing markup minification.

use minify_html::{Cfg, minify};

/// Collapse whitespace and drop comments.
///
/// Inline `<style>`/`<script>` bodies are left as written; stylesheets and
/// scripts go through their own pipelines.
pub fn minify_markup(html: &str) -> String {
    let cfg = Cfg {
        keep_closing_tags: true,
        keep_html_and_head_opening_tags: true,
        ..Cfg::default()
    };
    let bytes = minify(html.as_bytes(), &cfg);
    // Input is valid UTF-8 and the minifier only removes bytes
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        let html = "<!doctype html>\n<html>\n  <body>\n    <p>  hello   world  </p>\n    <!-- note -->\n  </body>\n</html>\n";
        let min = minify_markup(html);
        assert!(min.len() < html.len());
        assert!(min.contains("hello world"));
        assert!(!min.contains("note"));
    }
}
