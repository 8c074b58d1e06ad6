//! Stylesheet pipeline.
//!
//! ```text
//! sources ─► inline @import ─► [webp rules] ─► parse ─► prefix + shorthand
//!         ─► group @media ─► style.css      (readable)
//!                         └► style.min.css  (minified)
//! ```
//!
//! The SCSS variant enters after `inline @import`, with the compiled sheet.

mod import;
mod media;
mod webp;

pub use import::bundle;
pub use media::group_media_queries;
pub use webp::rewrite as rewrite_webp;

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

use crate::config::section::build::{BrowserTargets, encode_version};

/// Options resolved from config and build mode.
#[derive(Debug, Clone, Default)]
pub struct CssOptions {
    pub browsers: Browsers,
    /// Add `.webp` rule variants before parsing.
    pub webp: bool,
    pub source_maps: bool,
}

/// One printed stylesheet, with its map when requested.
#[derive(Debug, Clone)]
pub struct CssOutput {
    pub code: String,
    pub map: Option<String>,
}

/// Readable and minified prints of the same sheet.
#[derive(Debug, Clone)]
pub struct CssPair {
    pub readable: CssOutput,
    pub minified: CssOutput,
}

pub fn browsers(targets: &BrowserTargets) -> Browsers {
    let mut browsers = Browsers::default();
    for (name, version) in targets.entries() {
        let version = encode_version(version);
        match name {
            "android" => browsers.android = version,
            "chrome" => browsers.chrome = version,
            "edge" => browsers.edge = version,
            "firefox" => browsers.firefox = version,
            "ie" => browsers.ie = version,
            "ios_saf" => browsers.ios_saf = version,
            "opera" => browsers.opera = version,
            "safari" => browsers.safari = version,
            "samsung" => browsers.samsung = version,
            _ => {}
        }
    }
    browsers
}

/// Run the post-bundle pipeline on `source`.
///
/// `filename` names the bundle in diagnostics and source maps.
pub fn process(source: &str, filename: &str, options: &CssOptions) -> Result<CssPair> {
    let source = if options.webp {
        rewrite_webp(source)
    } else {
        source.to_string()
    };

    let mut sheet = StyleSheet::parse(
        &source,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow!("{filename}: {e}"))?;

    sheet
        .minify(MinifyOptions {
            targets: Targets::from(options.browsers),
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("{filename}: {e}"))?;
    group_media_queries(&mut sheet);

    let print = |minify: bool| -> Result<CssOutput> {
        let mut map = if options.source_maps {
            Some(new_source_map(filename, &source)?)
        } else {
            None
        };
        let result = sheet
            .to_css(PrinterOptions {
                minify,
                targets: Targets::from(options.browsers),
                source_map: map.as_mut(),
                ..PrinterOptions::default()
            })
            .map_err(|e| anyhow!("{filename}: {e}"))?;
        let map = match map.as_mut() {
            Some(map) => Some(
                map.to_json(None)
                    .map_err(|e| anyhow!("{filename}: source map: {e:?}"))?,
            ),
            None => None,
        };
        Ok(CssOutput {
            code: result.code,
            map,
        })
    };

    Ok(CssPair {
        readable: print(false)?,
        minified: print(true)?,
    })
}

/// Map seeded with `source` as its only (embedded) source.
fn new_source_map(filename: &str, source: &str) -> Result<SourceMap> {
    let mut map = SourceMap::new("/");
    let index = map.add_source(filename);
    map.set_source_content(index as usize, source)
        .map_err(|e| anyhow!("{filename}: source map: {e:?}"))?;
    Ok(map)
}

/// Append the `sourceMappingURL` comment for `map_name`.
pub fn with_map_comment(code: &str, map_name: &str) -> String {
    let mut out = String::with_capacity(code.len() + map_name.len() + 32);
    out.push_str(code);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!("/*# sourceMappingURL={map_name} */\n"));
    out
}
