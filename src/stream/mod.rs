//! Bulk-generation progress protocol: event payloads and the reducer that consumes them.

pub mod events;
pub mod consumer;

pub use consumer::{ProgressConsumer, Step, UNREPORTED_TARGET_ERROR};
pub use events::{decode_payload, StreamEvent};
