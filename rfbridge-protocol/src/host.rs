//! Host-side serial commands
//!
//! A few single-frame messages from the PC are intercepted by the host radio
//! instead of (or as well as) being forwarded to the device. The host answers
//! them with single bytes on its serial port.

/// PC asks for a time-sync marker to be forwarded
pub const HOST_TIME_SYNC: u8 = b'<';
/// Host acknowledges that the time-sync marker went out
pub const HOST_TIME_SYNC_ACK: u8 = b',';
/// PC asks for the current radio channel
pub const HOST_CHANNEL_QUERY: u8 = 0x00;
/// PC asks for a channel change, followed by the channel byte
pub const HOST_CHANNEL_CHANGE: u8 = 0x01;
/// Requested channel is out of range
pub const HOST_CHANNEL_CHANGE_INVALID: u8 = 0x02;
/// Channel change confirmed by the device on the new channel
pub const HOST_CHANNEL_CHANGE_SUCCESS: u8 = 0x03;

/// Terminator appended to every diagnostic line written to the PC
pub const DIAGNOSTIC_TERMINATOR: &[u8] = b"$$$";

/// Command recognised in a single-frame page from the PC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostCommand {
    /// Forward the marker and ack it locally
    TimeSync,
    /// Report the channel locally, do not forward
    ChannelQuery,
    /// Start the channel-change handshake
    ChannelChange(u8),
}

impl HostCommand {
    /// Recognise a command from a page payload
    ///
    /// Only exact lengths match: a one-byte page for time sync or query, a
    /// two-byte page for channel change. Anything else is ordinary data.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        match *payload {
            [HOST_TIME_SYNC] => Some(HostCommand::TimeSync),
            [HOST_CHANNEL_QUERY] => Some(HostCommand::ChannelQuery),
            [HOST_CHANNEL_CHANGE, channel] => Some(HostCommand::ChannelChange(channel)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(HostCommand::parse(b"<"), Some(HostCommand::TimeSync));
        assert_eq!(HostCommand::parse(&[0x00]), Some(HostCommand::ChannelQuery));
        assert_eq!(
            HostCommand::parse(&[0x01, 12]),
            Some(HostCommand::ChannelChange(12))
        );
    }

    #[test]
    fn test_ordinary_data_is_not_a_command() {
        assert_eq!(HostCommand::parse(b"b"), None);
        assert_eq!(HostCommand::parse(b"<<"), None);
        assert_eq!(HostCommand::parse(&[0x01]), None);
        assert_eq!(HostCommand::parse(&[0x01, 2, 3]), None);
        assert_eq!(HostCommand::parse(&[]), None);
    }
}
