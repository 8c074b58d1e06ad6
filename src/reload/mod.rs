//! Live reload for `dev`.
//!
//! ```text
//! RunnerActor -> WsActor -> Browser
//!   (tasks)   (broadcast)   (livereload.js)
//! ```
//!
//! - `message` - JSON messages sent to the browser
//! - `server` - WebSocket listener handing clients to `WsActor`

pub mod message;
pub mod server;
