use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::FsActor;
use crate::actor::messages::{RunMsg, WsMsg};
use crate::actor::runner::RunnerActor;
use crate::actor::ws::WsActor;

/// Run all actors concurrently until the shutdown signal, or until the
/// watcher or runner stops on its own.
pub(super) async fn run_actors(
    fs: FsActor,
    runner: RunnerActor,
    ws: Option<WsActor>,
    run_tx: mpsc::Sender<RunMsg>,
    ws_tx: Option<mpsc::Sender<WsMsg>>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let mut fs_handle = tokio::spawn(fs.run());
    let mut runner_handle = tokio::spawn(runner.run());
    let ws_handle = ws.map(|ws| tokio::spawn(ws.run()));

    let shutdown = async {
        loop {
            let signalled = shutdown_rx.as_ref().is_some_and(|rx| rx.try_recv().is_ok());
            if signalled || crate::core::is_shutdown() {
                crate::debug!("actor"; "shutdown signal received");
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    };

    tokio::select! {
        _ = shutdown => {}
        _ = &mut fs_handle => {}
        _ = &mut runner_handle => {}
    }

    let _ = run_tx.send(RunMsg::Shutdown).await;
    if let Some(tx) = ws_tx {
        let _ = tx.send(WsMsg::Shutdown).await;
    }

    let grace = Duration::from_millis(500);
    if !runner_handle.is_finished() {
        let _ = tokio::time::timeout(grace, runner_handle).await;
    }
    if let Some(handle) = ws_handle {
        let _ = tokio::time::timeout(grace, handle).await;
    }
    if !fs_handle.is_finished() {
        fs_handle.abort();
    }
}
