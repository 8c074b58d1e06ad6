//! Core types - pure abstractions shared across the codebase.

mod category;
mod driver;
mod state;

pub use category::AssetClass;
pub use driver::BuildMode;
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
