//! rfbridge radio protocol
//!
//! This crate defines the over-the-air format used between the host (USB
//! side) and the device (microcontroller side) radios, plus the handful of
//! byte codes the host exchanges with the PC over its serial port.
//!
//! # Frame Overview
//!
//! Every radio message is at most 32 bytes. Its meaning depends only on its
//! length:
//! ```text
//! len 0    keepalive / ack
//! len 1    control code (or a raw channel number during a channel change)
//! len 2-32 ┌─────────┬──────────────────────┐
//!          │ BYTE-ID │ PAYLOAD (1-31 bytes) │
//!          └─────────┴──────────────────────┘
//! ```
//!
//! The Byte-ID packs a stream flag, a 4-bit countdown index (0 = last frame
//! of a page) and a 3-bit additive checksum of the payload.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod byte_id;
pub mod checksum;
pub mod codes;
pub mod frame;
pub mod host;
pub mod stream;

pub use byte_id::ByteId;
pub use checksum::{checksum, verify};
pub use codes::ControlCode;
pub use frame::{
    classify, DataFrame, FrameError, FrameKind, RadioFrame, MAX_FRAME_SIZE, MAX_PAGE_FRAMES,
    MAX_PAGE_SIZE, MAX_PAYLOAD_SIZE,
};
pub use host::HostCommand;
pub use stream::{
    encode_stream_output, is_stream_tail, STREAM_OUTPUT_SIZE, STREAM_OUTPUT_START,
    STREAM_PACKET_HEAD, STREAM_PAYLOAD_SIZE,
};
