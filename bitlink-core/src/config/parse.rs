//! Simple TOML parser for link configuration
//!
//! A minimal line parser for the subset `link.toml` uses. Full TOML is
//! NOT supported, and no allocator is needed.
//!
//! Supported features:
//! - `[link]`, `[timing]` and `[roster]` section headers
//! - Key = value pairs (string, integer)
//! - Single-line arrays of integers and strings
//! - Comments (# ...)

use bitlink_protocol::DeviceId;

use super::types::{ConfigError, LinkConfig, PinConfig};

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Link,
    Timing,
    Roster,
}

/// Parse TOML configuration into a validated [`LinkConfig`]
///
/// Keys that are absent keep their [`LinkConfig::default`] value.
pub fn parse_config(input: &str) -> Result<LinkConfig, ConfigError> {
    let mut config = LinkConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::InvalidValue)?;
        apply_value(section, key, value, &mut config)?;
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ConfigError> {
    match header.trim() {
        "link" => Ok(Section::Link),
        "timing" => Ok(Section::Timing),
        "roster" => Ok(Section::Roster),
        _ => Err(ConfigError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut LinkConfig,
) -> Result<(), ConfigError> {
    match (section, key) {
        (Section::Link, "own_id") => config.own_id = parse_device(value)?,
        (Section::Link, "signal_pin") => config.signal_pin = parse_pin(value)?,
        (Section::Link, "data_pin") => config.data_pin = parse_pin(value)?,
        (Section::Link, "led_pin") => {
            config.led_pin = match parse_string(value)? {
                "none" => None,
                _ => Some(parse_pin(value)?),
            }
        }
        (Section::Timing, "setup_us") => config.timing.setup_us = parse_int(value)?,
        (Section::Timing, "strobe_us") => config.timing.strobe_us = parse_int(value)?,
        (Section::Timing, "hold_us") => config.timing.hold_us = parse_int(value)?,
        (Section::Timing, "frame_gap_us") => config.timing.frame_gap_us = parse_int(value)?,
        (Section::Roster, "devices") => parse_devices(value, config)?,
        (Section::Roster, "reply_window_ms") => config.reply_window_ms = parse_int(value)?,
        _ => return Err(ConfigError::UnknownKey),
    }
    Ok(())
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ConfigError> {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        Ok(&value[1..value.len() - 1])
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue)
}

/// Parse a pin string like "gpio14" or "^gpio15"
fn parse_pin(value: &str) -> Result<PinConfig, ConfigError> {
    let value = parse_string(value)?;
    let (pull_up, s) = match value.strip_prefix('^') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    let pin = s
        .strip_prefix("gpio")
        .ok_or(ConfigError::InvalidPin)?
        .parse()
        .map_err(|_| ConfigError::InvalidPin)?;

    Ok(PinConfig { pin, pull_up })
}

/// Parse a link id: an integer or a quoted catalogue name like "dht22"
fn parse_device(value: &str) -> Result<u16, ConfigError> {
    if value.starts_with('"') {
        let name = parse_string(value)?;
        DeviceId::from_name(name)
            .map(DeviceId::link_id)
            .ok_or(ConfigError::UnknownDevice)
    } else {
        parse_int(value)
    }
}

/// Parse a roster list like `["dht22", "battery", 9]`
fn parse_devices(value: &str, config: &mut LinkConfig) -> Result<(), ConfigError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ConfigError::InvalidValue)?;

    config.devices.clear();
    for item in inner.split(',') {
        let item = item.trim();
        // Allow a trailing comma
        if item.is_empty() {
            continue;
        }
        let id = parse_device(item)?;
        config
            .devices
            .push(id)
            .map_err(|_| ConfigError::TooManyDevices)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkTiming;
    use crate::roster::MAX_DEVICES;

    const COORDINATOR: &str = r#"
# Coordinator on the default pins
[link]
own_id = 0
signal_pin = "gpio14"
data_pin = "^gpio15"   # external pull-down fitted on the other side
led_pin = "gpio25"

[timing]
setup_us = 200
strobe_us = 200
hold_us = 200
frame_gap_us = 10000

[roster]
devices = ["dht22", "battery", 9]
reply_window_ms = 750
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(COORDINATOR).unwrap();
        assert!(config.is_coordinator());
        assert_eq!(config.signal_pin, PinConfig::new(14));
        assert_eq!(config.data_pin, PinConfig::with_pullup(15));
        assert_eq!(config.led_pin, Some(PinConfig::new(25)));
        assert_eq!(
            config.timing,
            LinkTiming {
                setup_us: 200,
                strobe_us: 200,
                hold_us: 200,
                frame_gap_us: 10_000,
            }
        );
        assert_eq!(
            config.devices.as_slice(),
            &[DeviceId::Dht22.link_id(), DeviceId::Battery.link_id(), 9]
        );
        assert_eq!(config.reply_window_ms, 750);
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = parse_config("[link]\nown_id = \"gy87\"\nled_pin = \"none\"\n").unwrap();
        assert_eq!(config.own_id, DeviceId::Gy87.link_id());
        assert!(!config.is_coordinator());
        assert_eq!(config.led_pin, None);
        assert_eq!(config.timing, LinkTiming::DEFAULT);
        assert_eq!(config.signal_pin, LinkConfig::default().signal_pin);
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_config("").unwrap(), LinkConfig::default());
    }

    #[test]
    fn test_parse_pin() {
        assert_eq!(parse_pin("gpio11").unwrap(), PinConfig::new(11));
        assert_eq!(parse_pin("\"^gpio4\"").unwrap(), PinConfig::with_pullup(4));
        assert_eq!(parse_pin("pin4"), Err(ConfigError::InvalidPin));
        assert_eq!(parse_pin("gpio"), Err(ConfigError::InvalidPin));
        assert_eq!(parse_pin("gpio300"), Err(ConfigError::InvalidPin));
    }

    #[test]
    fn test_parse_key_value_comments() {
        assert_eq!(parse_key_value("a = 5 # five"), Some(("a", "5")));
        assert_eq!(parse_key_value("a = \"x#y\""), Some(("a", "\"x#y\"")));
        assert_eq!(parse_key_value("a ="), None);
        assert_eq!(parse_key_value("nothing"), None);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_config("[bus]"), Err(ConfigError::InvalidSection));
        assert_eq!(
            parse_config("[link]\nbaud = 9600"),
            Err(ConfigError::UnknownKey)
        );
        assert_eq!(parse_config("own_id = 1"), Err(ConfigError::UnknownKey));
        assert_eq!(
            parse_config("[timing]\nhold_us = fast"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_config("[timing]\nframe_gap_us = 500"),
            Err(ConfigError::InvalidTiming)
        );
        assert_eq!(
            parse_config("[link]\ndata_pin = \"gpio14\""),
            Err(ConfigError::PinConflict)
        );
        assert_eq!(
            parse_config("[roster]\ndevices = [\"toaster\"]"),
            Err(ConfigError::UnknownDevice)
        );
        assert_eq!(
            parse_config("[roster]\ndevices = 3"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_config("[roster]\ndevices = [0]"),
            Err(ConfigError::InvalidValue)
        );
    }

    #[test]
    fn test_roster_values_rejected() {
        // A device image with a bad roster must not parse; the firmware
        // would otherwise fall back to the coordinator default
        assert_eq!(
            parse_config("[link]\nown_id = \"dht22\"\n[roster]\nreply_window_ms = 0"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_config("[roster]\ndevices = [\"battery\", 7]"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_config("[roster]\ndevices = [2, 0]"),
            Err(ConfigError::InvalidValue)
        );
        assert_eq!(
            parse_config("[roster]\nreply_window_ms = -5"),
            Err(ConfigError::InvalidValue)
        );
    }

    #[test]
    fn test_too_many_devices() {
        let mut list = heapless::String::<64>::new();
        list.push_str("[roster]\ndevices = [").unwrap();
        for id in 1..=MAX_DEVICES + 1 {
            core::fmt::Write::write_fmt(&mut list, format_args!("{id},")).unwrap();
        }
        list.push(']').unwrap();

        assert_eq!(parse_config(&list), Err(ConfigError::TooManyDevices));
    }
}
