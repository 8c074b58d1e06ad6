//! Per-file transformations, one submodule per asset kind.
//!
//! Nothing here touches the output tree or the registry; the tasks in
//! [`crate::task`] decide what to read and where to write.
//!
//! ```text
//! html   include ─► webp <picture> ─► minify
//! css    inline @import ─► webp rules ─► prefix/shorthand ─► group @media ─► print ×2
//! scss   compile ──────────┘
//! js     bundle ─► lower ─► minify | map
//! font   sfnt ⇄ woff ─► woff2
//! ```

pub mod css;
pub mod font;
pub mod html;
pub mod js;
pub mod scss;
