//! Radio transport abstraction
//!
//! The transport is a single-hop, acknowledged, point-to-point link between
//! exactly one host and one device. Delivery is "reliable enough" but not
//! loss-free; integrity and retries are handled by the protocol layer above.

/// Identifies the remote end that delivered a frame
///
/// A host can in principle serve several device pipes; the bridge only ever
/// talks to one, but replies are addressed to whoever sent the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerId(pub u8);

/// Radio transport used by the bridge
///
/// On the host side `send_to_peer` queues an acknowledgement payload for the
/// next exchange with the device; on the device side it transmits to the
/// host immediately. Either way it must not block.
pub trait RadioTransport {
    /// Error type for transmit operations
    type Error;

    /// Send `data` (0..=32 bytes) to the peer
    fn send_to_peer(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Switch the radio to a new channel
    fn set_channel(&mut self, channel: u8);

    /// Current radio channel
    fn channel(&self) -> u8;
}
