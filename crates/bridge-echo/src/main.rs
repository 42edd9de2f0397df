//! Echo server entry point.
//!
//! Demonstrates the caller-owned scheduling contract of the bridge: all
//! sockets are non-blocking, so this binary supplies the only loop in the
//! system — a single-threaded poll sweep over the listener and every
//! connected client. No epoll, no threads; just repeated single-attempt
//! calls, the way a managed runtime would drive the bridge from its own
//! scheduler.
//!
//! ```text
//! main()
//!  └─ EchoConfig::load()   -- optional TOML path from argv[1]
//!  └─ listen(port)
//!  └─ poll loop
//!       ├─ accept()        -> register new client
//!       ├─ try_receive()   -> WouldBlock: skip; Closed: drop; Data: echo
//!       └─ sleep(poll_interval)
//! ```

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bridge_core::{
    accept, close, listen, local_port, try_receive, try_send, RecvStatus, SendStatus, SocketHandle,
};

mod config;
use config::EchoConfig;

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EchoConfig::load(Path::new(&path))
            .with_context(|| format!("loading config from {path}"))?,
        None => EchoConfig::default(),
    };

    let listener =
        listen(config.port).with_context(|| format!("listen on port {}", config.port))?;
    info!(port = local_port(listener)?, "echo server listening");

    let mut clients: Vec<SocketHandle> = Vec::new();
    loop {
        // One accept attempt per sweep; would-block just means nobody new.
        if let Ok(client) = accept(listener) {
            info!(%client, "client connected");
            clients.push(client);
        }

        clients.retain(|&client| service(client, config.max_read));

        thread::sleep(Duration::from_millis(config.poll_interval_ms));
    }
}

/// Polls one client; returns `false` when the connection is finished and
/// has been closed.
fn service(client: SocketHandle, max_read: usize) -> bool {
    match try_receive(client, max_read) {
        Ok(RecvStatus::WouldBlock) => true,
        Ok(RecvStatus::Data(buf)) => echo(client, &buf),
        Ok(RecvStatus::Closed) => {
            info!(%client, "client disconnected");
            let _ = close(client);
            false
        }
        Err(err) => {
            warn!(%client, %err, "receive failed");
            let _ = close(client);
            false
        }
    }
}

/// Writes the whole buffer back, resubmitting the unsent tail whenever the
/// kernel takes a short count or reports would-block.
fn echo(client: SocketHandle, buf: &[u8]) -> bool {
    let mut rest = buf;
    while !rest.is_empty() {
        match try_send(client, rest) {
            Ok(SendStatus::Sent(count)) => rest = &rest[count..],
            Ok(SendStatus::WouldBlock) => thread::sleep(Duration::from_millis(1)),
            Err(err) => {
                warn!(%client, %err, "send failed");
                let _ = close(client);
                return false;
            }
        }
    }
    true
}
