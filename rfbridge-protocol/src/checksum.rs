//! 3-bit additive-complement checksum
//!
//! The payload bytes are summed, the sum is negated and the low three bits
//! are kept. Three bits is all the Byte-ID has room for, so roughly one in
//! eight corruptions goes unnoticed; changes that alter the sum by a
//! multiple of 8 are invisible to it.

/// Bits of the Byte-ID occupied by the checksum
pub const CHECKSUM_MASK: u8 = 0x07;

/// Compute the 3-bit checksum of `payload`
///
/// An empty payload checksums to 0.
pub fn checksum(payload: &[u8]) -> u8 {
    let sum = payload
        .iter()
        .fold(0u32, |acc, &byte| acc.wrapping_add(byte as u32));
    (sum.wrapping_neg() as u8) & CHECKSUM_MASK
}

/// Check the checksum embedded in a framed message
///
/// `frame[0]` is the Byte-ID, the rest is the payload. Returns false for
/// an empty frame.
pub fn verify(frame: &[u8]) -> bool {
    match frame.split_first() {
        Some((&byte_id, payload)) => byte_id & CHECKSUM_MASK == checksum(payload),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_checksum_known_values() {
        assert_eq!(checksum(&[]), 0);
        // -1 & 7
        assert_eq!(checksum(&[1]), 7);
        // 0x41 + 0x42 = 0x83, -0x83 & 7 = 5
        assert_eq!(checksum(b"AB"), 5);
        assert_eq!(checksum(&[8, 8, 8]), 0);
    }

    #[test]
    fn test_verify_empty_frame() {
        assert!(!verify(&[]));
    }

    #[test]
    fn test_verify_header_only_frame() {
        assert!(verify(&[0x00]));
        assert!(!verify(&[0x01]));
    }

    #[test]
    fn test_change_by_eight_goes_unnoticed() {
        let payload = [10u8, 20, 30];
        let mut frame = [checksum(&payload), 10, 20, 30];
        assert!(verify(&frame));

        // Known blind spot of a 3-bit sum
        frame[2] = frame[2].wrapping_add(8);
        assert!(verify(&frame));
    }

    proptest! {
        #[test]
        fn prop_verify_accepts_own_checksum(payload in proptest::collection::vec(any::<u8>(), 0..31)) {
            let mut frame = [0u8; 32];
            frame[0] = checksum(&payload);
            frame[1..1 + payload.len()].copy_from_slice(&payload);
            prop_assert!(verify(&frame[..1 + payload.len()]));
        }

        #[test]
        fn prop_low_bit_flip_is_detected(
            payload in proptest::collection::vec(any::<u8>(), 1..31),
            pos in any::<proptest::sample::Index>(),
        ) {
            let mut frame = [0u8; 32];
            frame[0] = checksum(&payload);
            frame[1..1 + payload.len()].copy_from_slice(&payload);

            let i = 1 + pos.index(payload.len());
            frame[i] ^= 0x01;
            prop_assert!(!verify(&frame[..1 + payload.len()]));
        }

        #[test]
        fn prop_checksum_fits_three_bits(payload in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert!(checksum(&payload) <= CHECKSUM_MASK);
        }
    }
}
