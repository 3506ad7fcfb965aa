//! Minimal TOML reader for [`BridgeConfig`]
//!
//! Handles the flat subset a bridge config needs:
//!
//! ```toml
//! # comment
//! [bridge]
//! role = "host"
//! default_channel = 12
//! poll_interval_ms = 80
//! announce = false
//! ```
//!
//! Unknown keys and other sections are ignored. No allocation.

use super::role::Role;
use super::types::{BridgeConfig, ConfigError};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Line is neither a section, a comment nor `key = value`
    InvalidLine(usize),
    /// Value has the wrong type or is out of range for its key
    InvalidValue(usize),
    /// Unknown role name
    InvalidRole(usize),
    /// Parsed, but the result is not usable
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(err: ConfigError) -> Self {
        ParseError::Invalid(err)
    }
}

/// Parse and validate a bridge configuration
pub fn parse_config(input: &str) -> Result<BridgeConfig, ParseError> {
    let mut config = BridgeConfig::default();
    let mut in_bridge = true;

    for (number, line) in input.lines().enumerate() {
        let line_no = number + 1;
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if let Some(section) = line.strip_prefix('[') {
            let name = section
                .strip_suffix(']')
                .ok_or(ParseError::InvalidLine(line_no))?;
            in_bridge = name.trim() == "bridge";
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or(ParseError::InvalidLine(line_no))?;
        if !in_bridge {
            continue;
        }

        let value = value.trim();
        match key.trim() {
            "role" => {
                let name = parse_string(value).ok_or(ParseError::InvalidValue(line_no))?;
                config.role = Role::from_name(name).ok_or(ParseError::InvalidRole(line_no))?;
            }
            "default_channel" => {
                config.default_channel =
                    value.parse().map_err(|_| ParseError::InvalidValue(line_no))?;
            }
            "poll_interval_ms" => {
                config.poll_interval_ms =
                    value.parse().map_err(|_| ParseError::InvalidValue(line_no))?;
            }
            "serial_quiet_ms" => {
                config.serial_quiet_ms =
                    value.parse().map_err(|_| ParseError::InvalidValue(line_no))?;
            }
            "stream_quiet_us" => {
                config.stream_quiet_us =
                    value.parse().map_err(|_| ParseError::InvalidValue(line_no))?;
            }
            "announce" => {
                config.announce = parse_bool(value).ok_or(ParseError::InvalidValue(line_no))?;
            }
            _ => {}
        }
    }

    config.validate()?;
    Ok(config)
}

fn strip_comment(line: &str) -> &str {
    // '#' inside a quoted string is not a comment
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_string(value: &str) -> Option<&str> {
    value.strip_prefix('"')?.strip_suffix('"')
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST_CONFIG: &str = r#"
# bridge on the USB dongle
[bridge]
role = "host"          # answers polls
default_channel = 12
poll_interval_ms = 100
announce = false

[board]
led = 2
"#;

    #[test]
    fn test_parse_host_config() {
        let config = parse_config(HOST_CONFIG).unwrap();
        assert_eq!(config.role, Role::Host);
        assert_eq!(config.default_channel, 12);
        assert_eq!(config.poll_interval_ms, 100);
        assert!(!config.announce);
        // untouched keys keep their defaults
        assert_eq!(config.serial_quiet_ms, 1);
        assert_eq!(config.stream_quiet_us, 100);
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_config(""), Ok(BridgeConfig::default()));
    }

    #[test]
    fn test_keys_without_section() {
        let config = parse_config("role = \"pass-through\"\n").unwrap();
        assert_eq!(config.role, Role::PassThrough);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        assert_eq!(
            parse_config("[bridge]\nrole = host\n"),
            Err(ParseError::InvalidValue(2))
        );
        assert_eq!(
            parse_config("role = \"dongle\""),
            Err(ParseError::InvalidRole(1))
        );
        assert_eq!(parse_config("[bridge\n"), Err(ParseError::InvalidLine(1)));
        assert_eq!(
            parse_config("announce = yes"),
            Err(ParseError::InvalidValue(1))
        );
    }

    #[test]
    fn test_out_of_range_channel() {
        assert_eq!(
            parse_config("default_channel = 40"),
            Err(ParseError::Invalid(ConfigError::ChannelOutOfRange(40)))
        );
        assert_eq!(
            parse_config("default_channel = 300"),
            Err(ParseError::InvalidValue(1))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_accepts_same_document() {
        #[derive(serde::Deserialize)]
        struct File {
            bridge: BridgeConfig,
        }

        let file: File = ::toml::from_str(HOST_CONFIG).unwrap();
        assert_eq!(file.bridge, parse_config(HOST_CONFIG).unwrap());
    }
}
