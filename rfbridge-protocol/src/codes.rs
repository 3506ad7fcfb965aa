//! Single-byte control codes exchanged between the radios

/// Control codes carried by length-1 frames
///
/// During a channel change the device also receives a raw channel number in
/// a length-1 frame; that byte is interpreted by handshake state, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlCode {
    /// Checksum mismatch, resend the same frame
    BadChecksum,
    /// Index gap, restart the whole page
    PacketMissed,
    /// The device's serial ingest buffer overflowed
    DeviceSerialOverflow,
    /// Host asks the device to prepare for a channel change
    ChangeChannelHostRequest,
    /// Device is waiting for the new channel number
    ChangeChannelDeviceReady,
    /// The peer sent a code this side does not accept
    InvalidCodeReceived,
}

// Wire format values
const CODE_BAD_CHECKSUM: u8 = 0x01;
const CODE_PACKET_MISSED: u8 = 0x02;
const CODE_DEVICE_SERIAL_OVERFLOW: u8 = 0x03;
const CODE_CHANGE_CHANNEL_HOST_REQUEST: u8 = 0x05;
const CODE_CHANGE_CHANNEL_DEVICE_READY: u8 = 0x06;
const CODE_INVALID_CODE_RECEIVED: u8 = 0xFF;

impl ControlCode {
    /// Parse a code from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CODE_BAD_CHECKSUM => Some(ControlCode::BadChecksum),
            CODE_PACKET_MISSED => Some(ControlCode::PacketMissed),
            CODE_DEVICE_SERIAL_OVERFLOW => Some(ControlCode::DeviceSerialOverflow),
            CODE_CHANGE_CHANNEL_HOST_REQUEST => Some(ControlCode::ChangeChannelHostRequest),
            CODE_CHANGE_CHANNEL_DEVICE_READY => Some(ControlCode::ChangeChannelDeviceReady),
            CODE_INVALID_CODE_RECEIVED => Some(ControlCode::InvalidCodeReceived),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            ControlCode::BadChecksum => CODE_BAD_CHECKSUM,
            ControlCode::PacketMissed => CODE_PACKET_MISSED,
            ControlCode::DeviceSerialOverflow => CODE_DEVICE_SERIAL_OVERFLOW,
            ControlCode::ChangeChannelHostRequest => CODE_CHANGE_CHANNEL_HOST_REQUEST,
            ControlCode::ChangeChannelDeviceReady => CODE_CHANGE_CHANNEL_DEVICE_READY,
            ControlCode::InvalidCodeReceived => CODE_INVALID_CODE_RECEIVED,
        }
    }

    /// Returns true for codes that ask the sender to retransmit
    pub fn is_retry_request(&self) -> bool {
        matches!(self, ControlCode::BadChecksum | ControlCode::PacketMissed)
    }

    /// Returns true for codes belonging to the channel-change handshake
    pub fn is_handshake(&self) -> bool {
        matches!(
            self,
            ControlCode::ChangeChannelHostRequest | ControlCode::ChangeChannelDeviceReady
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        let codes = [
            ControlCode::BadChecksum,
            ControlCode::PacketMissed,
            ControlCode::DeviceSerialOverflow,
            ControlCode::ChangeChannelHostRequest,
            ControlCode::ChangeChannelDeviceReady,
            ControlCode::InvalidCodeReceived,
        ];

        for code in codes {
            assert_eq!(ControlCode::from_byte(code.to_byte()), Some(code));
        }
    }

    #[test]
    fn test_unknown_code() {
        assert!(ControlCode::from_byte(0x00).is_none());
        // Reserved for the never-sent init packet
        assert!(ControlCode::from_byte(0x04).is_none());
        assert!(ControlCode::from_byte(0x42).is_none());
    }

    #[test]
    fn test_code_groups() {
        assert!(ControlCode::BadChecksum.is_retry_request());
        assert!(ControlCode::PacketMissed.is_retry_request());
        assert!(!ControlCode::InvalidCodeReceived.is_retry_request());
        assert!(ControlCode::ChangeChannelDeviceReady.is_handshake());
        assert!(!ControlCode::DeviceSerialOverflow.is_handshake());
    }
}
