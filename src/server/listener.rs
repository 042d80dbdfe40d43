use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::files::{Router, Storage};
use crate::http::connection::{Connection, ConnectionLimits};
use crate::http::mime::MimeTable;

/// Builds the router from `cfg`, creating the storage root if needed.
pub fn build_router(cfg: &Config) -> anyhow::Result<Router> {
    let storage = Storage::open(&cfg.storage.root).with_context(|| {
        format!("creating storage root {}", cfg.storage.root.display())
    })?;
    info!("Serving files from {}", storage.root().display());

    Ok(Router::new(storage, MimeTable::default()).with_server_name(&cfg.server.server_name))
}

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let router = Arc::new(build_router(cfg)?);
    let listener = TcpListener::bind(&cfg.server.listen_addr)
        .await
        .with_context(|| format!("binding {}", cfg.server.listen_addr))?;
    info!("Listening on {}", cfg.server.listen_addr);

    serve(listener, router, limits(cfg)).await
}

/// Accept loop over an already bound listener.
pub async fn serve(
    listener: TcpListener,
    router: Arc<Router>,
    limits: ConnectionLimits,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let router = Arc::clone(&router);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, router, limits);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}

fn limits(cfg: &Config) -> ConnectionLimits {
    ConnectionLimits {
        max_request_bytes: cfg.server.max_request_bytes,
        read_timeout: cfg.server.read_timeout(),
    }
}
