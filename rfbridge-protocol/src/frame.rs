//! Radio frame construction and classification
//!
//! Frame format (length-dispatched, see crate docs):
//! - 0 bytes: keepalive
//! - 1 byte: control code
//! - 2..=32 bytes: BYTE-ID followed by 1..=31 payload bytes

use heapless::Vec;

use crate::byte_id::ByteId;
use crate::checksum;

/// Maximum radio frame size in bytes
pub const MAX_FRAME_SIZE: usize = 32;

/// Maximum payload bytes after the Byte-ID
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_SIZE - 1;

/// Maximum frames per page (the index field is four bits wide)
pub const MAX_PAGE_FRAMES: usize = 16;

/// Maximum reassembled page size
pub const MAX_PAGE_SIZE: usize = MAX_PAGE_FRAMES * MAX_PAYLOAD_SIZE;

/// Errors that can occur while building a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
    /// Data frames need at least one payload byte
    EmptyPayload,
}

/// A received data frame (length > 1), borrowed from the transport buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFrame<'a> {
    bytes: &'a [u8],
}

impl<'a> DataFrame<'a> {
    /// Header of this frame
    pub fn byte_id(&self) -> ByteId {
        ByteId::from_raw(self.bytes[0])
    }

    /// Payload after the header
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[1..]
    }

    /// Whole frame, header included
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Check the embedded checksum against the payload
    pub fn verify(&self) -> bool {
        checksum::verify(self.bytes)
    }
}

/// What a received frame means, decided by its length alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind<'a> {
    /// Zero-length poll / acknowledgement
    Keepalive,
    /// Single control byte
    Control(u8),
    /// Byte-ID plus payload
    Data(DataFrame<'a>),
}

/// Classify raw bytes delivered by the transport
pub fn classify(bytes: &[u8]) -> FrameKind<'_> {
    match bytes.len() {
        0 => FrameKind::Keepalive,
        1 => FrameKind::Control(bytes[0]),
        _ => FrameKind::Data(DataFrame { bytes }),
    }
}

/// A frame ready to hand to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioFrame {
    bytes: Vec<u8, MAX_FRAME_SIZE>,
}

impl RadioFrame {
    /// Zero-length keepalive
    pub fn keepalive() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Single-byte control frame
    pub fn control(code: u8) -> Self {
        let mut bytes = Vec::new();
        // Capacity is 32, a single push cannot fail
        let _ = bytes.push(code);
        Self { bytes }
    }

    /// Data frame with a freshly computed Byte-ID
    pub fn data(is_stream: bool, index: u8, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.is_empty() {
            return Err(FrameError::EmptyPayload);
        }
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let byte_id = ByteId::make(is_stream, index, payload);
        let mut bytes = Vec::new();
        bytes
            .push(byte_id.raw())
            .map_err(|_| FrameError::PayloadTooLarge)?;
        bytes
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self { bytes })
    }

    /// Bytes to transmit
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Frame length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for keepalives
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Classify this frame the way the receiver will
    pub fn kind(&self) -> FrameKind<'_> {
        classify(&self.bytes)
    }
}
