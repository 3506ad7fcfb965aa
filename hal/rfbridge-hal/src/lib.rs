//! rfbridge Hardware Abstraction Layer
//!
//! The bridge core never touches peripherals directly. Everything it needs
//! from the outside world is expressed as a trait in this crate and supplied
//! by the board support code (or by in-memory mocks in tests).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  rfbridge-core (Bridge context)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  rfbridge-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!         │          │          │        │
//!         ▼          ▼          ▼        ▼
//!      serial      radio     flash     clock
//! ```
//!
//! # Traits
//!
//! - [`uart::SerialRx`], [`uart::SerialTx`] - Local serial byte stream
//! - [`radio::RadioTransport`] - Point-to-point radio link
//! - [`flash::WordStorage`] - Word-addressed non-volatile storage
//! - [`clock::Clock`] - Monotonic millisecond/microsecond time

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod flash;
pub mod radio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
pub use flash::{FlashError, WordStorage};
pub use radio::{PeerId, RadioTransport};
pub use uart::{SerialPort, SerialRx, SerialTx, UartConfig};
