//! Board-agnostic logic for the serial-over-radio bridge
//!
//! One [`Bridge`] context owns every buffer and timer. The board support code
//! drives it from two places:
//!
//! - the main loop calls [`Bridge::poll`] as often as it can
//! - the radio stack calls [`Bridge::on_deliver`] for every received frame
//!
//! Contents:
//!
//! - Reassembly engine with two ping-pong page buffers
//! - Serial ingest paging and the stream packet recognizer
//! - Poll/keepalive timing
//! - Channel persistence and the channel-change handshake
//! - Role configuration
//! - The receive dispatcher and loop body tying it all together

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod bridge;
pub mod channel;
pub mod config;
pub mod poll;
pub mod radio;
pub mod serial;
pub mod shared;

#[cfg(test)]
mod testing;

pub use bridge::{Bridge, LoopStatus};
pub use config::{parse_config, BridgeConfig, Role, RoleConfig};
pub use shared::SharedBridge;
