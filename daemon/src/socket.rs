//! Listening sockets for the server.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::net::{TcpListener, UnixListener};
use wyoming_whisper_common::{ServerUri, Transport};

/// A bound TCP or Unix listener.
pub enum Listener {
    Tcp(TcpListener),
    Unix(UnixListener, PathBuf),
}

impl Listener {
    /// Bind to `uri`, removing a stale Unix socket if present.
    pub async fn bind(uri: &ServerUri) -> Result<Self> {
        match uri {
            ServerUri::Tcp(addr) => {
                let listener = TcpListener::bind(addr)
                    .await
                    .with_context(|| format!("Failed to bind TCP address {}", addr))?;
                Ok(Listener::Tcp(listener))
            }
            ServerUri::Unix(path) => Ok(Listener::Unix(create_listener(path)?, path.clone())),
        }
    }

    /// Wait for the next client. Returns the stream and a printable peer address.
    pub async fn accept(&self) -> Result<(Box<dyn Transport>, String)> {
        match self {
            Listener::Tcp(listener) => {
                let (stream, addr) = listener.accept().await?;
                stream.set_nodelay(true)?;
                Ok((Box::new(stream), addr.to_string()))
            }
            Listener::Unix(listener, path) => {
                let (stream, _) = listener.accept().await?;
                Ok((Box::new(stream), path.display().to_string()))
            }
        }
    }

    /// Address clients can connect to. For TCP this has the actual port.
    pub fn local_uri(&self) -> Result<ServerUri> {
        match self {
            Listener::Tcp(listener) => Ok(ServerUri::Tcp(listener.local_addr()?.to_string())),
            Listener::Unix(_, path) => Ok(ServerUri::Unix(path.clone())),
        }
    }

    /// Remove the socket file of a Unix listener.
    pub fn cleanup(&self) {
        if let Listener::Unix(_, path) = self {
            cleanup_socket(path);
        }
    }
}

/// Create a Unix listener, removing stale socket if present.
pub fn create_listener(path: &Path) -> Result<UnixListener> {
    if path.exists() {
        std::fs::remove_file(path).context("Failed to remove existing socket")?;
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create socket directory")?;
    }

    UnixListener::bind(path).context("Failed to bind Unix socket")
}

/// Remove the socket file.
pub fn cleanup_socket(path: &Path) {
    let _ = std::fs::remove_file(path);
}

#[cfg(test)]
#[path = "socket_test.rs"]
mod tests;
