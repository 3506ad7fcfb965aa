//! Operating roles

use rfbridge_hal::UartConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Serial baud rate used by every role
pub const SERIAL_BAUDRATE: u32 = 115_200;

/// Device UART receive pin
pub const DEVICE_RX_PIN: u8 = 3;

/// Device UART transmit pin
pub const DEVICE_TX_PIN: u8 = 2;

/// Which end of the link this radio is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Role {
    /// Microcontroller side; initiates every radio exchange
    #[default]
    Device,
    /// PC side (USB serial); answers the device's polls
    Host,
    /// Radio idle, serial wired straight through for programming
    PassThrough,
}

impl Role {
    /// Parse a role name as written in a config file
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "device" => Some(Role::Device),
            "host" => Some(Role::Host),
            "pass-through" | "pass_through" | "passthrough" => Some(Role::PassThrough),
            _ => None,
        }
    }
}

/// Buffers cleared at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootReset {
    pub radio: bool,
    pub serial: bool,
    pub stream: bool,
}

/// Behaviour selected by the role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RoleConfig {
    pub role: Role,
    /// Local serial wiring
    pub uart: UartConfig,
    pub boot_reset: BootReset,
    /// Radio and buffers are in use at all
    pub radio_enabled: bool,
    /// Recognize stream packets in the serial input
    pub stream_initiator: bool,
    /// May start a channel change
    pub channel_change_initiator: bool,
    /// Answers CHANGE_CHANNEL_HOST_REQUEST
    pub handshake_responder: bool,
    /// Sends keepalives when idle
    pub polls: bool,
}

impl RoleConfig {
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Device => Self {
                role,
                uart: UartConfig::with_pins(SERIAL_BAUDRATE, DEVICE_RX_PIN, DEVICE_TX_PIN),
                boot_reset: BootReset {
                    radio: true,
                    serial: true,
                    stream: true,
                },
                radio_enabled: true,
                stream_initiator: true,
                channel_change_initiator: false,
                handshake_responder: true,
                polls: true,
            },
            Role::Host => Self {
                role,
                uart: UartConfig {
                    baudrate: SERIAL_BAUDRATE,
                    rx_pin: None,
                    tx_pin: None,
                },
                boot_reset: BootReset {
                    radio: true,
                    serial: true,
                    stream: true,
                },
                radio_enabled: true,
                stream_initiator: false,
                channel_change_initiator: true,
                handshake_responder: true,
                polls: false,
            },
            Role::PassThrough => Self {
                role,
                uart: UartConfig {
                    baudrate: SERIAL_BAUDRATE,
                    rx_pin: None,
                    tx_pin: None,
                },
                boot_reset: BootReset {
                    radio: false,
                    serial: false,
                    stream: false,
                },
                radio_enabled: false,
                stream_initiator: false,
                channel_change_initiator: false,
                handshake_responder: false,
                polls: false,
            },
        }
    }

    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    pub fn is_device(&self) -> bool {
        self.role == Role::Device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_wiring() {
        let config = RoleConfig::for_role(Role::Device);
        assert_eq!(config.uart.rx_pin, Some(3));
        assert_eq!(config.uart.tx_pin, Some(2));
        assert_eq!(config.uart.baudrate, 115_200);
        assert!(config.stream_initiator);
        assert!(!config.channel_change_initiator);
        assert!(config.polls);
    }

    #[test]
    fn test_host_defaults() {
        let config = RoleConfig::for_role(Role::Host);
        assert_eq!(config.uart, UartConfig::default());
        assert!(config.channel_change_initiator);
        assert!(config.handshake_responder);
        assert!(!config.stream_initiator);
        assert!(!config.polls);
    }

    #[test]
    fn test_pass_through_runs_nothing() {
        let config = RoleConfig::for_role(Role::PassThrough);
        assert!(!config.radio_enabled);
        assert!(!config.stream_initiator);
        assert!(!config.channel_change_initiator);
        assert!(!config.handshake_responder);
        assert_eq!(config.boot_reset, BootReset::default());
    }

    #[test]
    fn test_role_names() {
        assert_eq!(Role::from_name("host"), Some(Role::Host));
        assert_eq!(Role::from_name("pass-through"), Some(Role::PassThrough));
        assert_eq!(Role::from_name("dongle"), None);
    }
}
