pub mod client;
pub mod dirs;
pub mod uri;

pub use client::WyomingClient;
pub use uri::{DEFAULT_URI, ServerUri, Transport};
