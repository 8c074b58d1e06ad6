//! Live-reload script injection.

use crate::embed::serve::script_tag;

/// Inject the live-reload script if content is HTML and reload is available.
pub fn maybe_inject_livereload(body: Vec<u8>, content_type: &str, ws_port: Option<u16>) -> Vec<u8> {
    if injects(content_type, ws_port) {
        inject_script(&body, script_tag().as_bytes())
    } else {
        body
    }
}

/// Length of a `len`-byte file once served, for `HEAD`.
pub fn served_len(len: u64, content_type: &str, ws_port: Option<u16>) -> u64 {
    if injects(content_type, ws_port) {
        len + script_tag().len() as u64
    } else {
        len
    }
}

fn injects(content_type: &str, ws_port: Option<u16>) -> bool {
    content_type.starts_with("text/html") && ws_port.is_some()
}

/// Insert `script` before the last `</body>`, or append it.
fn inject_script(content: &[u8], script: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script);
    result.extend_from_slice(&content[pos..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types::{CSS, HTML};

    const TAG: &str = r#"<script src="/__kiln/livereload.js"></script>"#;

    fn inject(body: &str, content_type: &str, port: Option<u16>) -> String {
        String::from_utf8(maybe_inject_livereload(body.as_bytes().to_vec(), content_type, port)).unwrap()
    }

    #[test]
    fn test_injects_before_body_close() {
        let out = inject("<html><body><p>x</p></BODY></html>", HTML, Some(35729));
        assert_eq!(out, format!("<html><body><p>x</p>{TAG}</BODY></html>"));
    }

    #[test]
    fn test_appends_without_body_tag() {
        let out = inject("<p>fragment</p>", HTML, Some(35729));
        assert_eq!(out, format!("<p>fragment</p>{TAG}"));
    }

    #[test]
    fn test_untouched_when_not_html_or_disabled() {
        assert_eq!(inject("body{}", CSS, Some(35729)), "body{}");
        assert_eq!(inject("<body></body>", HTML, None), "<body></body>");
    }

    #[test]
    fn test_served_len_matches_injected_body() {
        for (body, content_type, port) in [
            ("<html><body></body></html>", HTML, Some(35729)),
            ("<p>fragment</p>", HTML, Some(35729)),
            ("<body></body>", HTML, None),
            ("body{}", CSS, Some(35729)),
        ] {
            let served = inject(body, content_type, port).len() as u64;
            assert_eq!(served_len(body.len() as u64, content_type, port), served);
        }
    }
}
