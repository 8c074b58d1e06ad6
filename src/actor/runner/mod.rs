//! Runner Actor
//!
//! Runs the task of each changed asset class on the blocking pool and turns
//! the result into a status line plus a live-reload message.
//!
//! ```text
//! Changed([css, js]) ─► SlotTable ─┬─► spawn_blocking(Task::run) ─► Finished
//!                                  └─► dirty (already running)
//! Finished ─► WatchStatus ─► WsMsg::{Css, Reload} + WsMsg::Error
//!          └─► dirty? run once more
//! ```

mod slots;

use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::{RunMsg, WsMsg};
use crate::config::SiteConfig;
use crate::core::AssetClass;
use crate::logger::{status_error, status_success};
use crate::task::{Task, TaskReport};
use slots::SlotTable;

pub struct RunnerActor {
    rx: mpsc::Receiver<RunMsg>,
    /// Handed to blocking runs for their `Finished` message
    tx: mpsc::Sender<RunMsg>,
    /// Absent in `watch` (no server)
    ws_tx: Option<mpsc::Sender<WsMsg>>,
    config: Arc<SiteConfig>,
    slots: SlotTable,
}

impl RunnerActor {
    pub fn new(
        rx: mpsc::Receiver<RunMsg>,
        tx: mpsc::Sender<RunMsg>,
        ws_tx: Option<mpsc::Sender<WsMsg>>,
        config: Arc<SiteConfig>,
    ) -> Self {
        Self {
            rx,
            tx,
            ws_tx,
            config,
            slots: SlotTable::default(),
        }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                RunMsg::Changed(classes) => {
                    for class in classes {
                        if self.slots.request(class) {
                            self.spawn(class);
                        } else {
                            crate::debug!("watch"; "{} busy, queued one more run", class);
                        }
                    }
                }
                RunMsg::Finished { class, report } => {
                    self.publish(class, &report).await;
                    if self.slots.finish(class) {
                        self.spawn(class);
                    }
                }
                RunMsg::Shutdown => {
                    if !self.slots.is_idle() {
                        crate::debug!("watch"; "shutting down with runs in flight");
                    }
                    break;
                }
            }
        }
    }

    fn spawn(&self, class: AssetClass) {
        crate::debug!("watch"; "running {}", class);
        let config = Arc::clone(&self.config);
        let tx = self.tx.clone();
        // Task::run catches panics, so every run ends with Finished
        tokio::task::spawn_blocking(move || {
            let report = Task::Asset(class).run(&config);
            let _ = tx.blocking_send(RunMsg::Finished { class, report });
        });
    }

    async fn publish(&self, class: AssetClass, report: &TaskReport) {
        let messages = outcome_messages(class, report, &self.config);
        match messages.last() {
            Some(WsMsg::Error { task, message }) => status_error(&format!("{task} failed"), message),
            _ => status_success(&format!("{}: {}", class, report.headline())),
        }
        if let Some(ws_tx) = &self.ws_tx {
            for msg in messages {
                if ws_tx.send(msg).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Browser messages for a finished run.
///
/// Outputs that were written are always refreshed: stylesheets are swapped
/// in place, everything else reloads the page. Failures follow the refresh,
/// since a refresh clears the error replayed to reconnecting pages.
fn outcome_messages(class: AssetClass, report: &TaskReport, config: &SiteConfig) -> Vec<WsMsg> {
    let mut messages = Vec::with_capacity(2);
    if report.is_ok() || !report.written.is_empty() {
        messages.push(if class.is_stylesheet() {
            WsMsg::Css
        } else {
            WsMsg::Reload {
                reason: format!("{class} rebuilt"),
            }
        });
    }
    if !report.is_ok() {
        messages.push(WsMsg::Error {
            task: class.title().to_string(),
            message: report.failure_detail(config.get_root()),
        });
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixture;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_outcome_messages() {
        let (_dir, config) = fixture::project("");
        let ok = TaskReport::new("css");
        assert!(matches!(
            outcome_messages(AssetClass::Styles, &ok, &config).as_slice(),
            [WsMsg::Css]
        ));
        assert!(matches!(
            outcome_messages(AssetClass::Scripts, &ok, &config).as_slice(),
            [WsMsg::Reload { reason }] if reason == "js rebuilt"
        ));

        let mut failed = TaskReport::new("js");
        failed.fail(config.get_root().join("src/js/main.js"), "unexpected token");
        match outcome_messages(AssetClass::Scripts, &failed, &config).as_slice() {
            [WsMsg::Error { task, message }] => {
                assert_eq!(task, "JavaScript");
                assert_eq!(message, "src/js/main.js: unexpected token");
            }
            other => panic!("unexpected messages {other:?}"),
        }
    }

    #[test]
    fn test_partial_failure_still_refreshes() {
        let (_dir, config) = fixture::project("");
        let root = config.get_root();
        let mut report = TaskReport::new("html");
        report.written.push(root.join("dist/index.html"));
        report.fail(root.join("src/about.html"), "missing include");

        match outcome_messages(AssetClass::Markup, &report, &config).as_slice() {
            [WsMsg::Reload { .. }, WsMsg::Error { message, .. }] => {
                assert_eq!(message, "src/about.html: missing include");
            }
            other => panic!("unexpected messages {other:?}"),
        }

        let mut css = TaskReport::new("css");
        css.written.push(root.join("dist/css/style.css"));
        css.fail(root.join("dist/css/style.min.css"), "write failed");
        assert!(matches!(
            outcome_messages(AssetClass::Styles, &css, &config).as_slice(),
            [WsMsg::Css, WsMsg::Error { .. }]
        ));
    }

    #[test]
    fn test_change_runs_task_and_notifies() {
        let (dir, config) = fixture::project("");
        fixture::write(dir.path(), "src/index.html", "<p>hi</p>");
        let config = Arc::new(config);

        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let (tx, rx) = mpsc::channel(8);
            let (ws_tx, mut ws_rx) = mpsc::channel(8);
            let runner = RunnerActor::new(rx, tx.clone(), Some(ws_tx), Arc::clone(&config));
            let handle = tokio::spawn(runner.run());

            tx.send(RunMsg::Changed(vec![AssetClass::Markup])).await.unwrap();
            let msg = tokio::time::timeout(Duration::from_secs(10), ws_rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert!(matches!(msg, WsMsg::Reload { .. }));

            tx.send(RunMsg::Shutdown).await.unwrap();
            handle.await.unwrap();
        });

        let out: PathBuf = config.get_root().join("dist/index.html");
        assert!(out.exists());
    }
}
