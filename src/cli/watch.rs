//! `watch` and `dev`.

use std::sync::Arc;

use anyhow::Result;

use super::serve;
use crate::{actor::Coordinator, config::SiteConfig, log};

/// Rebuild on changes until Ctrl+C. No initial build, no server.
pub fn watch(config: Arc<SiteConfig>) -> Result<()> {
    log!("watch"; "{} mode", config.mode().label());
    Coordinator::with_config(config).run_blocking()
}

/// Build once, then watch and serve with live reload.
///
/// A failed initial build is reported but does not stop the server; the
/// next change retries the affected task.
pub fn dev(config: Arc<SiteConfig>) -> Result<()> {
    if !super::build::build(&config) {
        log!("serve"; "initial build had failures, serving anyway");
    }
    crate::logger::status_detach();

    let server = serve::bind_server(&config)?;
    crate::debug!("serve"; "bound {}", server.addr());
    server.run()
}
