use std::net::TcpStream;
use std::time::Duration;

use tungstenite::protocol::Message;

use super::{Clients, WsActor};
use crate::reload::message::ReloadMessage;

impl WsActor {
    /// Handshake, greet and register a new connection.
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Blocking handshake, non-blocking afterwards for the reader poll
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };

        if let Err(e) = ws.send(Message::Text(ReloadMessage::connected().to_json().into())) {
            crate::log!("ws"; "failed to send connected message: {}", e);
            return;
        }
        if let Some(err) = self.pending_error.lock().as_ref()
            && let Err(e) = ws.send(Message::Text(err.to_json().into()))
        {
            crate::debug!("ws"; "failed to send pending error: {}", e);
        }

        let _ = ws.get_ref().set_nonblocking(true);
        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }
}

/// Drain incoming frames so pings are answered and closed sockets dropped.
pub(super) fn reader_loop(clients: Clients) {
    while !crate::core::is_shutdown() {
        std::thread::sleep(Duration::from_millis(100));

        let mut clients = clients.lock();
        clients.retain_mut(|ws| loop {
            match ws.read() {
                Ok(Message::Close(_)) => break false,
                Ok(_) => continue,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    break true;
                }
                Err(_) => break false,
            }
        });
    }
}
