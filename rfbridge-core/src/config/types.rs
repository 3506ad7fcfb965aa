//! Bridge tunables

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::role::Role;
use crate::channel::{CHANNEL_MAX, DEFAULT_CHANNEL};
use crate::poll::DEFAULT_POLL_INTERVAL_MS;
use crate::serial::ingest::DEFAULT_SERIAL_QUIET_MS;
use crate::serial::stream::DEFAULT_STREAM_QUIET_US;

/// Invalid configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Default channel above the highest radio channel
    ChannelOutOfRange(u8),
    /// A poll interval of zero would flood the link
    ZeroPollInterval,
}

/// Bridge configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BridgeConfig {
    pub role: Role,
    /// Channel written to storage on first boot
    pub default_channel: u8,
    /// Device keepalive interval; the host declares the link lost after two
    pub poll_interval_ms: u32,
    /// Serial silence before a page is considered complete
    pub serial_quiet_ms: u32,
    /// Silence after a stream tail before the packet is launched
    pub stream_quiet_us: u32,
    /// Host prints its banner and channel at boot
    pub announce: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new(Role::Device)
    }
}

impl BridgeConfig {
    /// Defaults for `role`
    pub const fn new(role: Role) -> Self {
        Self {
            role,
            default_channel: DEFAULT_CHANNEL,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            serial_quiet_ms: DEFAULT_SERIAL_QUIET_MS,
            stream_quiet_us: DEFAULT_STREAM_QUIET_US,
            announce: true,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_channel > CHANNEL_MAX {
            return Err(ConfigError::ChannelOutOfRange(self.default_channel));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.role, Role::Device);
        assert_eq!(config.default_channel, 25);
        assert_eq!(config.poll_interval_ms, 80);
        assert_eq!(config.serial_quiet_ms, 1);
        assert_eq!(config.stream_quiet_us, 100);
        assert!(config.announce);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validate() {
        let mut config = BridgeConfig::new(Role::Host);
        config.default_channel = 26;
        assert_eq!(config.validate(), Err(ConfigError::ChannelOutOfRange(26)));

        config.default_channel = 0;
        config.poll_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPollInterval));
    }
}
