//! WebSocket Actor
//!
//! Owns every live-reload connection and broadcasts reload, stylesheet and
//! error messages to all of them.
//!
//! ```text
//! RunnerActor --[Reload/Css/Error]--> WsActor --[broadcast]--> Clients
//! ```

mod client_io;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::WsMsg;
use crate::reload::message::ReloadMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    /// Shared with the reader thread that drops closed sockets
    clients: Clients,
    /// Last failure, replayed to clients that connect while it is unresolved
    pending_error: Arc<Mutex<Option<ReloadMessage>>>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            pending_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || client_io::reader_loop(clients_for_reader));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Reload { reason } => {
                    crate::debug!("ws"; "sending reload: {}", reason);
                    *self.pending_error.lock() = None;
                    self.broadcast(&ReloadMessage::reload(reason));
                }
                WsMsg::Css => {
                    *self.pending_error.lock() = None;
                    self.broadcast(&ReloadMessage::Css);
                }
                WsMsg::Error { task, message } => {
                    let msg = ReloadMessage::error(task, message);
                    self.broadcast(&msg);
                    *self.pending_error.lock() = Some(msg);
                }
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    for mut client in self.clients.lock().drain(..) {
                        let _ = client.close(None);
                    }
                    break;
                }
            }
        }
    }

    /// Send to every client, dropping the ones that fail.
    fn broadcast(&self, msg: &ReloadMessage) {
        let text = Message::Text(msg.to_json().into());
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("ws"; "no clients connected");
            return;
        }
        clients.retain_mut(|client| match client.send(text.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", clients.len());
    }
}
