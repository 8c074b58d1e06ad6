//! Development server with live reload support.

mod content;
mod lifecycle;
mod path;
mod response;

use crate::{
    actor::coordinator::WsChannel,
    config::{SiteConfig, cfg},
    embed::serve::LIVERELOAD_URL,
    log,
};
use anyhow::{Context, Result};
use crossbeam::channel;
use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    /// Live-reload port, when the WebSocket listener is up
    ws_port: Option<u16>,
    websocket: Option<WsChannel>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind HTTP and WebSocket listeners without starting the request loop.
pub fn bind_server(config: &SiteConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let websocket = WsChannel::new();
    let ws_port = match crate::reload::server::start_ws_server(
        config.serve.interface,
        config.serve.reload_port,
        websocket.tx.clone(),
    ) {
        Ok(port) => {
            crate::debug!("reload"; "ws://{}:{}", config.serve.interface, port);
            Some(port)
        }
        Err(e) => {
            log!("reload"; "live reload disabled: {:#}", e);
            None
        }
    };

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        addr,
        ws_port,
        websocket: ws_port.map(|_| websocket),
        shutdown_rx,
    })
}

impl BoundServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the watcher and the request loop (blocking until Ctrl+C).
    pub fn run(self) -> Result<()> {
        let actor_handle = lifecycle::spawn_actors(cfg(), self.websocket, self.shutdown_rx);
        run_request_loop(&self.server, self.ws_port)?;
        lifecycle::wait_for_shutdown(actor_handle);
        Ok(())
    }
}

fn run_request_loop(server: &Server, ws_port: Option<u16>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &cfg(), ws_port) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &SiteConfig, ws_port: Option<u16>) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let serve_root = config.registry.clean_dir();

    if let Some(port) = ws_port
        && path::strip_query(request.url()) == LIVERELOAD_URL
    {
        return response::respond_livereload_js(request, port);
    }

    if let Some(path) = path::resolve_path(request.url(), serve_root) {
        return response::respond_file(request, &path, ws_port);
    }

    response::respond_not_found(request, serve_root, ws_port)
}
