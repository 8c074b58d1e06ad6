//! Script pipeline.
//!
//! ```text
//! entry.js ─► bundle relative imports ─► lower to target ─┬─► minify        (production)
//!                                                         └─► print + .map  (development)
//! ```
//!
//! The development map is composed: printed bundle to bundle text, then
//! bundle text to the module files.

mod bundle;
mod transform;

pub use bundle::{Bundle, bundle_entry};
pub use transform::{Emitted, Output, transpile};

use std::path::Path;

use anyhow::{Result, anyhow};
use parcel_sourcemap::SourceMap;

use crate::core::BuildMode;

/// A built entry ready to be written.
#[derive(Debug)]
pub struct Script {
    pub code: String,
    pub map: Option<String>,
}

/// Bundle and transpile one entry. `out_name` is the file name of the
/// written bundle, used for the map reference.
pub fn build_script(entry: &Path, out_name: &str, target: &str, mode: BuildMode) -> Result<Script> {
    let Bundle { code, map: mut modules } = bundle_entry(entry)?;
    let output = if mode.is_production() {
        Output::Minified
    } else {
        Output::Mapped
    };
    let Emitted { code, map } = transpile(&code, Path::new(out_name), target, output)?;

    Ok(match map {
        Some(map) => Script {
            code: format!("{code}\n//# sourceMappingURL={out_name}.map\n"),
            map: Some(compose(&map, &mut modules)?),
        },
        None => Script { code, map: None },
    })
}

/// Chain the printer's map onto the bundle's map of module sources.
fn compose(printed: &str, modules: &mut SourceMap) -> Result<String> {
    let mut map = SourceMap::from_json("/", printed).map_err(|e| anyhow!("source map: {e:?}"))?;
    map.extends(modules).map_err(|e| anyhow!("source map: {e:?}"))?;
    map.to_json(None).map_err(|e| anyhow!("source map: {e:?}"))
}
