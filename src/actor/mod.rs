//! Actor System for Watch Mode
//!
//! Message-passing concurrency for `watch` and `dev`:
//!
//! ```text
//! FsActor --> RunnerActor --> WsActor
//! (watch)      (tasks)      (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `runner` - Per-class task runs, serialized and coalesced
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod runner;
pub mod ws;

pub use coordinator::Coordinator;
