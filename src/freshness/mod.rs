//! Mtime-based freshness detection.
//!
//! Image and font tasks skip a source when every output derived from it
//! exists and is at least as new as the source. Outputs are produced by this
//! tool from the source, so timestamps are a reliable signal.

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Check if `output` exists and is not older than `source`
pub fn is_output_fresh(source: &Path, output: &Path) -> bool {
    let (Some(source_time), Some(output_time)) = (get_mtime(source), get_mtime(output)) else {
        return false;
    };
    output_time >= source_time
}

/// Check if every output exists and is not older than `source`
pub fn all_fresh<P: AsRef<Path>>(source: &Path, outputs: &[P]) -> bool {
    !outputs.is_empty() && outputs.iter().all(|o| is_output_fresh(source, o.as_ref()))
}
