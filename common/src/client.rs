//! Wyoming client for talking to a wyoming-whisper server.

use anyhow::{Context, Result, bail};
use futures_util::{SinkExt, StreamExt};
use tokio_util::codec::Framed;
use tracing::debug;
use wyoming_whisper_proto::{
    AudioChunk, AudioFormat, AudioStart, AudioStop, Describe, Event, Eventable, Info, Transcribe,
    Transcript, WyomingCodec,
};

use crate::uri::{ServerUri, Transport};

/// A client connection to a Wyoming server.
pub struct WyomingClient {
    framed: Framed<Box<dyn Transport>, WyomingCodec>,
}

impl WyomingClient {
    /// Connect to the server at `uri`.
    pub async fn connect(uri: &ServerUri) -> Result<Self> {
        let stream = uri.connect().await?;
        debug!(uri = %uri, "Connected");
        Ok(Self::from_transport(stream))
    }

    /// Wrap an already open stream.
    pub fn from_transport(stream: Box<dyn Transport>) -> Self {
        Self {
            framed: Framed::new(stream, WyomingCodec::new()),
        }
    }

    /// Send a typed event.
    pub async fn send<E: Eventable>(&mut self, event: &E) -> Result<()> {
        self.send_event(event.to_event()).await
    }

    /// Send a raw event.
    pub async fn send_event(&mut self, event: Event) -> Result<()> {
        self.framed
            .send(event)
            .await
            .context("Failed to send event")
    }

    /// Receive the next event, or `None` once the server closes the connection.
    pub async fn recv(&mut self) -> Result<Option<Event>> {
        match self.framed.next().await {
            Some(event) => Ok(Some(event.context("Failed to read event")?)),
            None => Ok(None),
        }
    }

    /// Ask the server for its capabilities.
    pub async fn describe(&mut self) -> Result<Info> {
        self.send(&Describe {}).await?;
        let event = self.recv_type::<Info>().await?;
        Ok(Info::from_event(&event)?)
    }

    /// Stream one utterance of raw PCM and wait for its transcript.
    ///
    /// `audio` is split into chunks of `samples_per_chunk` frames.
    pub async fn transcribe(
        &mut self,
        format: AudioFormat,
        audio: &[u8],
        samples_per_chunk: usize,
        language: Option<String>,
    ) -> Result<Transcript> {
        self.send(&Transcribe {
            name: None,
            language,
        })
        .await?;
        self.send(&AudioStart {
            format,
            timestamp: None,
        })
        .await?;

        let chunk_bytes = (samples_per_chunk * format.frame_size()).max(1);
        for chunk in audio.chunks(chunk_bytes) {
            self.send(&AudioChunk::new(format, chunk.to_vec())).await?;
        }
        self.send(&AudioStop::default()).await?;
        debug!(bytes = audio.len(), "Sent audio");

        let event = self.recv_type::<Transcript>().await?;
        Ok(Transcript::from_event(&event)?)
    }

    /// Read events until one of type `E` arrives, skipping anything else.
    async fn recv_type<E: Eventable>(&mut self) -> Result<Event> {
        while let Some(event) = self.recv().await? {
            if event.is::<E>() {
                return Ok(event);
            }
            debug!(event_type = %event.event_type, "Skipping event");
        }
        bail!(
            "Connection closed before '{}' was received",
            E::EVENT_TYPE
        )
    }
}
