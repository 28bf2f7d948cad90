//! Accept loop and per-connection event pump.

use std::future::Future;

use anyhow::Result;
use futures_util::StreamExt;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};
use wyoming_whisper_common::Transport;
use wyoming_whisper_proto::WyomingCodec;

use crate::error::SessionError;
use crate::session::{SessionContext, SessionHandler};
use crate::socket::Listener;

/// Accept clients until `shutdown` completes, one task per connection.
///
/// A failing connection is logged and dropped; it never stops the loop.
pub async fn serve(
    listener: &Listener,
    context: SessionContext,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tokio::spawn(handle_connection(stream, peer, context.clone()));
                }
                Err(e) => error!(error = %e, "Accept error"),
            },
        }
    }
}

/// Drive one client session to completion.
pub async fn handle_connection(stream: Box<dyn Transport>, peer: String, context: SessionContext) {
    debug!(%peer, "Client connected");

    match run_session(stream, context).await {
        Ok(()) => debug!(%peer, "Client disconnected"),
        Err(e @ SessionError::Backend(_)) => error!(%peer, error = %e, "Session failed"),
        Err(e) => warn!(%peer, error = %e, "Session aborted"),
    }
}

async fn run_session(stream: Box<dyn Transport>, context: SessionContext) -> Result<(), SessionError> {
    let (reader, writer) = tokio::io::split(stream);
    let mut events = FramedRead::new(reader, WyomingCodec::new());
    let mut session = SessionHandler::new(context, FramedWrite::new(writer, WyomingCodec::new()));

    while let Some(event) = events.next().await {
        if !session.on_event(event?).await? {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "server_test.rs"]
mod tests;
