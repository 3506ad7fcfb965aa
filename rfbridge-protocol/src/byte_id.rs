//! Byte-ID frame header
//!
//! ```text
//!   7      6   5   4   3    2   1   0
//! ┌──────┬───────────────┬────────────┐
//! │STREAM│ INDEX / TYPE  │  CHECKSUM  │
//! └──────┴───────────────┴────────────┘
//! ```
//!
//! For page frames INDEX counts down to 0 (the last frame of the page).
//! For stream frames the same four bits carry the stream packet type.

use crate::checksum::{checksum, CHECKSUM_MASK};

/// Stream flag bit
pub const STREAM_FLAG: u8 = 0x80;

/// Mask of the index/type field (before shifting)
pub const INDEX_MASK: u8 = 0x0F;

/// Shift of the index/type field
pub const INDEX_SHIFT: u8 = 3;

/// High bits of the stop byte written after a stream packet
pub const STOP_BYTE_BASE: u8 = 0xC0;

/// One-byte frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ByteId(u8);

impl ByteId {
    /// Build the header for `payload`
    ///
    /// Only the low four bits of `index` are kept.
    pub fn make(is_stream: bool, index: u8, payload: &[u8]) -> Self {
        let mut raw = 0u8;
        if is_stream {
            raw |= STREAM_FLAG;
        }
        raw |= (index & INDEX_MASK) << INDEX_SHIFT;
        raw |= checksum(payload);
        Self(raw)
    }

    /// Wrap a received header byte
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// The header as it goes on the wire
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// True for stream (telemetry) frames
    pub const fn is_stream(self) -> bool {
        self.0 & STREAM_FLAG != 0
    }

    /// Countdown index of a page frame (0 = last)
    pub const fn index(self) -> u8 {
        (self.0 >> INDEX_SHIFT) & INDEX_MASK
    }

    /// Packet type of a stream frame
    pub const fn stream_type(self) -> u8 {
        self.index()
    }

    /// Embedded checksum
    pub const fn checksum(self) -> u8 {
        self.0 & CHECKSUM_MASK
    }

    /// Stop byte emitted after a stream packet on the host's serial port
    ///
    /// e.g. `0b1011_1000` (type 7) becomes `0b1100_0111`.
    pub const fn stop_byte(self) -> u8 {
        STOP_BYTE_BASE | self.stream_type()
    }
}

impl From<ByteId> for u8 {
    fn from(id: ByteId) -> u8 {
        id.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_make_layout() {
        let id = ByteId::make(true, 5, &[1]);
        assert_eq!(id.raw(), 0x80 | (5 << 3) | 7);
        assert!(id.is_stream());
        assert_eq!(id.index(), 5);
        assert_eq!(id.checksum(), 7);
    }

    #[test]
    fn test_index_is_truncated_to_four_bits() {
        let id = ByteId::make(false, 0x1F, &[]);
        assert_eq!(id.index(), 0x0F);
        assert!(!id.is_stream());
    }

    #[test]
    fn test_stop_byte() {
        let id = ByteId::from_raw(0b1011_1000);
        assert_eq!(id.stop_byte(), 0b1100_0111);
    }

    proptest! {
        #[test]
        fn prop_fields_decode(
            is_stream in any::<bool>(),
            index in 0u8..16,
            payload in proptest::collection::vec(any::<u8>(), 0..31),
        ) {
            let id = ByteId::make(is_stream, index, &payload);
            prop_assert_eq!(id.is_stream(), is_stream);
            prop_assert_eq!(id.index(), index);
            prop_assert_eq!(id.checksum(), checksum(&payload));
        }
    }
}
