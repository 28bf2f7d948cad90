//! Server addresses in `tcp://host:port` or `unix:///path` form.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UnixStream};

/// Default address the server binds and the client connects to.
pub const DEFAULT_URI: &str = "tcp://127.0.0.1:10300";

/// A bidirectional byte stream carrying Wyoming events.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Where a server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerUri {
    Tcp(String),
    Unix(PathBuf),
}

impl ServerUri {
    /// Open a client connection to this address.
    pub async fn connect(&self) -> Result<Box<dyn Transport>> {
        match self {
            ServerUri::Tcp(addr) => {
                let stream = TcpStream::connect(addr)
                    .await
                    .with_context(|| format!("Failed to connect to {}", addr))?;
                stream.set_nodelay(true)?;
                Ok(Box::new(stream))
            }
            ServerUri::Unix(path) => {
                let stream = UnixStream::connect(path)
                    .await
                    .with_context(|| format!("Failed to connect to {}", path.display()))?;
                Ok(Box::new(stream))
            }
        }
    }
}

impl FromStr for ServerUri {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(addr) = s.strip_prefix("tcp://") {
            if !addr.contains(':') {
                bail!("TCP address must include a port: {}", s);
            }
            return Ok(ServerUri::Tcp(addr.to_string()));
        }
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                bail!("Unix socket path is empty: {}", s);
            }
            return Ok(ServerUri::Unix(PathBuf::from(path)));
        }
        bail!("Unsupported URI scheme (expected tcp:// or unix://): {}", s)
    }
}

impl fmt::Display for ServerUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerUri::Tcp(addr) => write!(f, "tcp://{}", addr),
            ServerUri::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tcp() {
        let uri: ServerUri = "tcp://0.0.0.0:10300".parse().unwrap();
        assert_eq!(uri, ServerUri::Tcp("0.0.0.0:10300".to_string()));
        assert_eq!(uri.to_string(), "tcp://0.0.0.0:10300");
    }

    #[test]
    fn test_parse_unix() {
        let uri: ServerUri = "unix:///run/whisper.sock".parse().unwrap();
        assert_eq!(uri, ServerUri::Unix(PathBuf::from("/run/whisper.sock")));
    }

    #[test]
    fn test_default_uri_parses() {
        assert!(DEFAULT_URI.parse::<ServerUri>().is_ok());
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        let err = "http://localhost:10300".parse::<ServerUri>().unwrap_err();
        assert!(err.to_string().contains("Unsupported URI scheme"));
    }

    #[test]
    fn test_rejects_tcp_without_port() {
        assert!("tcp://localhost".parse::<ServerUri>().is_err());
        assert!("unix://".parse::<ServerUri>().is_err());
    }
}
