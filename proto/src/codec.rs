//! Wire framing for Wyoming events.
//!
//! ```text
//! {"type": "audio-chunk", "version": "1.5.4", "data_length": 42, "payload_length": 2048}\n
//! <42 bytes of JSON data><2048 bytes of payload>
//! ```
//!
//! Older peers put the data inline in the header under `"data"`. Both forms
//! are accepted on read; when both are present the separate block wins key by key.

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_util::codec::{Decoder, Encoder};

use crate::{Event, PROTOCOL_VERSION, ProtocolError};

/// Default cap on the header line length.
pub const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Default cap on the combined data and payload length of one event.
pub const MAX_BODY_LENGTH: usize = 16 * 1024 * 1024;

#[derive(Deserialize)]
struct InboundHeader {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: Option<Map<String, Value>>,
    #[serde(default)]
    data_length: Option<usize>,
    #[serde(default)]
    payload_length: Option<usize>,
}

#[derive(Serialize)]
struct OutboundHeader<'a> {
    #[serde(rename = "type")]
    event_type: &'a str,
    version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload_length: Option<usize>,
}

#[derive(Debug)]
enum DecodeState {
    Header,
    Body {
        event: Event,
        data_length: usize,
        payload_length: usize,
    },
}

/// Codec for reading and writing [`Event`]s on a byte stream.
#[derive(Debug)]
pub struct WyomingCodec {
    state: DecodeState,
    max_line_length: usize,
    max_body_length: usize,
}

impl Default for WyomingCodec {
    fn default() -> Self {
        Self::with_limits(MAX_LINE_LENGTH, MAX_BODY_LENGTH)
    }
}

impl WyomingCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with custom size limits.
    pub fn with_limits(max_line_length: usize, max_body_length: usize) -> Self {
        Self {
            state: DecodeState::Header,
            max_line_length,
            max_body_length,
        }
    }

    fn decode_header(&mut self, src: &mut BytesMut) -> Result<Option<()>, ProtocolError> {
        let Some(newline) = src.iter().position(|b| *b == b'\n') else {
            if src.len() > self.max_line_length {
                return Err(ProtocolError::LineTooLong {
                    limit: self.max_line_length,
                });
            }
            return Ok(None);
        };
        if newline > self.max_line_length {
            return Err(ProtocolError::LineTooLong {
                limit: self.max_line_length,
            });
        }

        let line = src.split_to(newline + 1);
        let line = line[..newline].trim_ascii();
        if line.is_empty() {
            return Ok(Some(()));
        }

        let header: InboundHeader = serde_json::from_slice(line)?;
        let data_length = header.data_length.unwrap_or(0);
        let payload_length = header.payload_length.unwrap_or(0);
        let length = data_length.saturating_add(payload_length);
        if length > self.max_body_length {
            return Err(ProtocolError::PayloadTooLarge {
                length,
                limit: self.max_body_length,
            });
        }

        self.state = DecodeState::Body {
            event: Event {
                event_type: header.event_type,
                data: header.data.unwrap_or_default(),
                payload: None,
            },
            data_length,
            payload_length,
        };
        Ok(Some(()))
    }
}

impl Decoder for WyomingCodec {
    type Item = Event;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Event>, ProtocolError> {
        loop {
            match std::mem::replace(&mut self.state, DecodeState::Header) {
                DecodeState::Header => {
                    if self.decode_header(src)?.is_none() {
                        return Ok(None);
                    }
                }
                DecodeState::Body {
                    mut event,
                    data_length,
                    payload_length,
                } => {
                    let needed = data_length + payload_length;
                    if src.len() < needed {
                        src.reserve(needed - src.len());
                        self.state = DecodeState::Body {
                            event,
                            data_length,
                            payload_length,
                        };
                        return Ok(None);
                    }

                    if data_length > 0 {
                        let data = src.split_to(data_length);
                        let extra: Map<String, Value> = serde_json::from_slice(&data)?;
                        event.data.extend(extra);
                    }
                    if payload_length > 0 {
                        event.payload = Some(src.split_to(payload_length).freeze());
                    }
                    return Ok(Some(event));
                }
            }
        }
    }
}

impl Encoder<Event> for WyomingCodec {
    type Error = ProtocolError;

    fn encode(&mut self, event: Event, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let data = if event.data.is_empty() {
            None
        } else {
            Some(serde_json::to_vec(&event.data)?)
        };
        let payload = event.payload.filter(|payload| !payload.is_empty());

        let header = OutboundHeader {
            event_type: &event.event_type,
            version: PROTOCOL_VERSION,
            data_length: data.as_ref().map(Vec::len),
            payload_length: payload.as_ref().map(|payload| payload.len()),
        };
        let header = serde_json::to_vec(&header)?;

        dst.reserve(
            header.len()
                + 1
                + data.as_ref().map_or(0, Vec::len)
                + payload.as_ref().map_or(0, |payload| payload.len()),
        );
        dst.put_slice(&header);
        dst.put_u8(b'\n');
        if let Some(data) = data {
            dst.put_slice(&data);
        }
        if let Some(payload) = payload {
            dst.put_slice(&payload);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod tests;
