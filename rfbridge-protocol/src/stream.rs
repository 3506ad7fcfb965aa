//! Stream (telemetry) packet framing on the serial links
//!
//! On the device's serial input a stream packet looks like
//! `HEAD | 31 payload bytes | 0xFX` where X is the packet type. It crosses
//! the radio as one 32-byte stream frame. The host re-frames it for the PC
//! as `0xA0 | 31 payload bytes | 0xCX`.

use crate::byte_id::ByteId;
use crate::frame::MAX_PAYLOAD_SIZE;

/// Head sentinel expected on the device's serial input
pub const STREAM_PACKET_HEAD: u8 = b'A';

/// High nibble of a valid tail byte on the device's serial input
pub const STREAM_PACKET_TAIL_MASK: u8 = 0xF0;

/// Start byte written by the host in front of each stream packet
pub const STREAM_OUTPUT_START: u8 = 0xA0;

/// Payload bytes of a stream packet
pub const STREAM_PAYLOAD_SIZE: usize = MAX_PAYLOAD_SIZE;

/// Size of a stream packet as written to the PC
pub const STREAM_OUTPUT_SIZE: usize = 1 + STREAM_PAYLOAD_SIZE + 1;

/// True if `byte` is a valid stream tail (`0xF0..=0xFF`)
pub const fn is_stream_tail(byte: u8) -> bool {
    byte & STREAM_PACKET_TAIL_MASK == STREAM_PACKET_TAIL_MASK
}

/// Re-frame a received stream frame for the PC
///
/// `frame` is the whole radio frame (Byte-ID first). Short payloads are
/// zero padded so the PC always receives fixed-size packets.
pub fn encode_stream_output(frame: &[u8]) -> [u8; STREAM_OUTPUT_SIZE] {
    let mut out = [0u8; STREAM_OUTPUT_SIZE];
    out[0] = STREAM_OUTPUT_START;

    if let Some((&raw_id, payload)) = frame.split_first() {
        let len = payload.len().min(STREAM_PAYLOAD_SIZE);
        out[1..1 + len].copy_from_slice(&payload[..len]);
        out[STREAM_OUTPUT_SIZE - 1] = ByteId::from_raw(raw_id).stop_byte();
    }

    out
}
