//! Radio page reassembly
//!
//! Pages arrive as 1-16 frames with a countdown index. Two page buffers are
//! kept so that a completed page can drain to the local serial port while
//! the next one is already being received.

pub mod engine;
pub mod page;

pub use engine::{BufferSlot, ReassemblyEngine, ReassemblyOutcome, SwitchError};
pub use page::{PageOverflow, RadioPageBuffer};
