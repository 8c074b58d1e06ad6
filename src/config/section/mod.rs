//! Configuration section definitions.
//!
//! Each module corresponds to a section in `kiln.toml`:
//!
//! | Module  | TOML Section | Purpose                                  |
//! |---------|--------------|------------------------------------------|
//! | `build` | `[build]`    | Mode, stylesheet variant, per-class opts |
//! | `paths` | `[paths]`    | Source/output/watch patterns per class   |
//! | `serve` | `[serve]`    | Development server                       |

pub mod build;
pub mod paths;
mod serve;

pub use build::{BuildSectionConfig, FontFormat, StylesheetVariant};
pub use paths::{ClassPaths, PathsConfig};
pub use serve::ServeConfig;
