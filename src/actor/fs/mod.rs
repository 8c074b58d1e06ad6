//! FileSystem Actor
//!
//! Watches source directories and sends the affected asset classes to the
//! RunnerActor once a change burst has settled.
//!
//! ```text
//! Watcher → Debouncer (pure timing) → Router (watch globs) → RunMsg::Changed
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::RunMsg;
use crate::config::SiteConfig;

// Pure timing and deduplication.
mod debouncer;
// Changed paths -> asset classes.
mod router;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;

#[cfg(test)]
mod tests;

use debouncer::Debouncer;
use router::{classes_for_changes, log_events};
use watch_roots::WatchRoots;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Watch-root consistency layer (attach/re-attach root directories)
    watch_roots: WatchRoots,
    runner_tx: mpsc::Sender<RunMsg>,
    debouncer: Debouncer,
    config: Arc<SiteConfig>,
}

impl FsActor {
    /// Start watching immediately; events buffer in the channel until
    /// [`run`](Self::run) is polled.
    pub fn new(
        paths: Vec<PathBuf>,
        runner_tx: mpsc::Sender<RunMsg>,
        config: Arc<SiteConfig>,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        // Missing roots are re-attached once they appear
        let mut watch_roots = WatchRoots::new(paths);
        watch_roots.attach_existing(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            runner_tx,
            debouncer: Debouncer::new(),
            config,
        })
    }

    /// Run the actor event loop until shutdown or the runner goes away.
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            runner_tx,
            mut debouncer,
            config,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify delivers on a std channel; bridge it into tokio
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::logger::status_warning(&format!("watcher error: {e}")),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    if crate::core::is_shutdown() {
                        break;
                    }
                    watch_roots.maintain(&mut watcher);
                    if process_changes(&mut debouncer, &runner_tx, &config).await.is_err() {
                        break;
                    }
                }
            }
        }
        crate::debug!("watch"; "stopped");
    }
}

/// Forward debounced changes.
///
/// Returns `Err(())` if RunnerActor shut down
async fn process_changes(
    debouncer: &mut Debouncer,
    runner_tx: &mpsc::Sender<RunMsg>,
    config: &SiteConfig,
) -> Result<(), ()> {
    let Some(events) = debouncer.take_if_ready() else {
        return Ok(());
    };
    log_events(&events);

    let classes = classes_for_changes(events.keys(), config);
    if classes.is_empty() {
        crate::debug!("watch"; "{} change(s) outside every watch pattern", events.len());
        return Ok(());
    }

    runner_tx.send(RunMsg::Changed(classes)).await.map_err(|_| ())
}
