//! Actor Message Definitions
//!
//! ```text
//! FsActor --Changed--> RunnerActor --Reload/Css/Error--> WsActor
//! ```

use crate::core::AssetClass;
use crate::task::TaskReport;

// =============================================================================
// RunnerActor Messages
// =============================================================================

/// Messages to Runner Actor
#[derive(Debug)]
pub enum RunMsg {
    /// Source files of these classes changed
    Changed(Vec<AssetClass>),
    /// A task run finished on the blocking pool
    Finished {
        class: AssetClass,
        report: TaskReport,
    },
    /// Shutdown
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Reload every connected page
    Reload { reason: String },
    /// Stylesheet changed, refresh `<link>` tags without reloading
    Css,
    /// Task failed; clients log it and keep the current page
    Error { task: String, message: String },
    /// Add client
    AddClient(std::net::TcpStream),
    /// Shutdown
    Shutdown,
}
