//! Radio channel persistence and the channel-change handshake
//!
//! The channel number lives in a single flash word. Changing it is driven by
//! the host and confirmed by the device in four steps, see [`handshake`].

pub mod handshake;
pub mod manager;

pub use handshake::{ChannelHandshake, HandshakeEvent, HandshakeState};
pub use manager::{
    ChannelError, ChannelManager, CHANNEL_MAX, CHANNEL_MIN, CHANNEL_PAGE, CHANNEL_UNSET,
    DEFAULT_CHANNEL,
};
