//! Untyped event envelope and the conversion trait for typed events.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::ProtocolError;

/// A single Wyoming event as it appears on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    pub event_type: String,
    pub data: Map<String, Value>,
    pub payload: Option<Bytes>,
}

impl Event {
    /// Create an event with no data and no payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Default::default()
        }
    }

    /// Replace the data block with the serialized form of `data`.
    ///
    /// Values that do not serialize to a JSON object leave the data empty.
    pub fn with_data<T: Serialize>(mut self, data: &T) -> Self {
        self.data = match serde_json::to_value(data) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        self
    }

    /// Attach a binary payload.
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Check whether this event carries the type of `T`.
    pub fn is<T: Eventable>(&self) -> bool {
        self.event_type == T::EVENT_TYPE
    }

    /// Deserialize the data block into `T`.
    pub fn decode_data<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        Ok(serde_json::from_value(Value::Object(self.data.clone()))?)
    }

    pub(crate) fn expect_type(&self, expected: &'static str) -> Result<(), ProtocolError> {
        if self.event_type == expected {
            Ok(())
        } else {
            Err(ProtocolError::UnexpectedType {
                expected,
                actual: self.event_type.clone(),
            })
        }
    }
}

/// A typed event that converts to and from the wire envelope.
pub trait Eventable: Sized {
    /// Value of the `type` header field.
    const EVENT_TYPE: &'static str;

    fn to_event(&self) -> Event;

    fn from_event(event: &Event) -> Result<Self, ProtocolError>;
}

/// Implements [`Eventable`] for a type whose fields map one-to-one onto the
/// data block and which carries no payload.
macro_rules! data_event {
    ($ty:ty, $name:literal) => {
        impl $crate::event::Eventable for $ty {
            const EVENT_TYPE: &'static str = $name;

            fn to_event(&self) -> $crate::event::Event {
                $crate::event::Event::new(Self::EVENT_TYPE).with_data(self)
            }

            fn from_event(
                event: &$crate::event::Event,
            ) -> Result<Self, $crate::error::ProtocolError> {
                event.expect_type(Self::EVENT_TYPE)?;
                event.decode_data()
            }
        }
    };
}

pub(crate) use data_event;
