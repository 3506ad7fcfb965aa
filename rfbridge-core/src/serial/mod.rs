//! Local serial side of the bridge
//!
//! - [`ingest`]: slices outbound serial bytes into radio-sized pages
//! - [`stream`]: spots telemetry packets in the device's serial input
//! - [`outbox`]: bytes waiting to be written to the local serial port

pub mod ingest;
pub mod outbox;
pub mod stream;

pub use ingest::{FetchOutcome, SerialPageBuffer, SERIAL_SLOT_COUNT};
pub use outbox::{LocalOutbox, StreamPacketQueue};
pub use stream::{StreamFrameBuffer, StreamState};
