//! Actor Coordinator - wires up the watch-mode actors.
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Wires up actors
//! - Runs them concurrently

mod runtime;

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::{RunMsg, WsMsg};
use super::runner::RunnerActor;
use super::ws::WsActor;
use crate::config::SiteConfig;

const CHANNEL_BUFFER: usize = 32;

/// Both ends of the live-reload channel. The sender is already handed to the
/// WebSocket listener when the coordinator receives it.
pub struct WsChannel {
    pub tx: mpsc::Sender<WsMsg>,
    pub rx: mpsc::Receiver<WsMsg>,
}

impl WsChannel {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER);
        Self { tx, rx }
    }
}

impl Default for WsChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<SiteConfig>,
    websocket: Option<WsChannel>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn with_config(config: Arc<SiteConfig>) -> Self {
        Self {
            config,
            websocket: None,
            shutdown_rx: None,
        }
    }

    /// Broadcast results to live-reload clients.
    pub fn with_websocket(mut self, channel: WsChannel) -> Self {
        self.websocket = Some(channel);
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run on a dedicated tokio runtime until shutdown.
    pub fn run_blocking(self) -> Result<()> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("failed to create tokio runtime")?;
        rt.block_on(self.run())
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let (run_tx, run_rx) = mpsc::channel::<RunMsg>(CHANNEL_BUFFER);

        let (ws_tx, ws_actor) = match self.websocket.take() {
            Some(WsChannel { tx, rx }) => (Some(tx), Some(WsActor::new(rx))),
            None => (None, None),
        };

        let roots = self.config.registry.watch_roots();
        for root in &roots {
            crate::debug!("watch"; "root: {}", root.display());
        }
        let fs_actor = FsActor::new(roots, run_tx.clone(), Arc::clone(&self.config))
            .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;
        let runner = RunnerActor::new(run_rx, run_tx.clone(), ws_tx.clone(), Arc::clone(&self.config));

        crate::log!("watch"; "watching for changes");
        runtime::run_actors(
            fs_actor,
            runner,
            ws_actor,
            run_tx,
            ws_tx,
            self.shutdown_rx.take(),
        )
        .await;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
