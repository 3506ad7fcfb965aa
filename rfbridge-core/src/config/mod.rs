//! Configuration
//!
//! [`BridgeConfig`] holds the tunables a board may override; [`RoleConfig`]
//! is derived from the role and decides which parts of the bridge run.

pub mod role;
pub mod toml;
pub mod types;

pub use role::{BootReset, Role, RoleConfig};
pub use toml::{parse_config, ParseError};
pub use types::{BridgeConfig, ConfigError};
