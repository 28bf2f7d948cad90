use std::convert::Infallible;

/// Errors raised while framing or interpreting Wyoming events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Header line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("Event body of {length} bytes exceeds {limit} bytes")]
    PayloadTooLarge { length: usize, limit: usize },

    #[error("Expected '{expected}' event, got '{actual}'")]
    UnexpectedType { expected: &'static str, actual: String },

    #[error("Invalid event data: {0}")]
    InvalidData(String),
}

impl From<Infallible> for ProtocolError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
