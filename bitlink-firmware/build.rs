//! Build script for bitlink-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates link.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Catalogue names accepted in `own_id` and `devices`
const DEVICE_NAMES: &[&str] = &[
    "dht22", "mics6814", "ky038", "gy87", "ccs811", "sds011", "battery",
];

const KNOWN_KEYS: &[(&str, &[&str])] = &[
    ("link", &["own_id", "signal_pin", "data_pin", "led_pin"]),
    ("timing", &["setup_us", "strobe_us", "hold_us", "frame_gap_us"]),
    ("roster", &["devices", "reply_window_ms"]),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate link.toml at compile time
///
/// Mirrors the checks of `bitlink_core::parse_config` and
/// `LinkConfig::validate`. A file that fails them at boot falls back to the
/// default config, which runs as coordinator.
fn validate_config() {
    println!("cargo:rerun-if-changed=link.toml");

    let config_path = Path::new("link.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail(&[format!("cannot read link.toml: {}", e)]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(&[format!("link.toml is not valid TOML: {}", e)]),
    };

    let mut errors = Vec::new();
    let root = match config.as_table() {
        Some(t) => t,
        None => fail(&["link.toml must be a table".to_string()]),
    };

    for (section, value) in root {
        let keys = match KNOWN_KEYS.iter().find(|(name, _)| name == section) {
            Some((_, keys)) => keys,
            None => {
                errors.push(format!("unknown section [{}]", section));
                continue;
            }
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", section));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", section, key));
            }
        }
    }

    let mut pins = Vec::new();
    if let Some(link) = config.get("link") {
        if let Some(id) = link.get("own_id") {
            check_device(id, "[link] own_id", &mut errors);
        }
        for key in ["signal_pin", "data_pin", "led_pin"] {
            match link.get(key).and_then(|v| v.as_str()) {
                Some("none") if key == "led_pin" => {}
                Some(pin) => match parse_pin(pin) {
                    Some(n) if pins.contains(&n) => {
                        errors.push(format!("[link] {} reuses gpio{}", key, n))
                    }
                    Some(n) => pins.push(n),
                    None => errors.push(format!("[link] {} '{}' is not gpio0-gpio29", key, pin)),
                },
                None if link.get(key).is_some() => {
                    errors.push(format!("[link] {} must be a string", key))
                }
                None => {}
            }
        }
    }

    if let Some(timing) = config.get("timing") {
        let get = |key: &str, default: i64| {
            timing
                .get(key)
                .and_then(|v| v.as_integer())
                .unwrap_or(default)
        };
        let bit = get("setup_us", 100) + get("strobe_us", 100) + get("hold_us", 100);
        for key in ["setup_us", "strobe_us", "hold_us"] {
            if get(key, 100) <= 0 {
                errors.push(format!("[timing] {} must be positive", key));
            }
        }
        if get("frame_gap_us", 5000) <= 2 * bit {
            errors.push(format!(
                "[timing] frame_gap_us must exceed two bit periods ({} us)",
                2 * bit
            ));
        }
    }

    if let Some(roster) = config.get("roster") {
        if let Some(window) = roster.get("reply_window_ms") {
            match window.as_integer() {
                Some(ms) if ms > 0 && ms <= u32::MAX as i64 => {}
                _ => errors.push("[roster] reply_window_ms must be a positive integer".to_string()),
            }
        }
        match roster.get("devices").map(|d| d.as_array()) {
            Some(Some(list)) if list.len() > 8 => {
                errors.push("[roster] at most 8 devices".to_string())
            }
            Some(Some(list)) => {
                let mut seen = Vec::new();
                for entry in list {
                    match check_device(entry, "[roster] devices", &mut errors) {
                        Some(0) => errors.push("[roster] devices: id 0 is the coordinator".to_string()),
                        Some(id) if seen.contains(&id) => {
                            errors.push(format!("[roster] devices: id {} listed twice", id))
                        }
                        Some(id) => seen.push(id),
                        None => {}
                    }
                }
            }
            Some(None) => errors.push("[roster] devices must be an array".to_string()),
            None => {}
        }
    }

    if !errors.is_empty() {
        fail(&errors);
    }
}

/// Resolve an id or catalogue name to its link id (catalogue index + 1)
fn check_device(value: &toml::Value, context: &str, errors: &mut Vec<String>) -> Option<u16> {
    match value {
        toml::Value::Integer(id) if (0..=u16::MAX as i64).contains(id) => Some(*id as u16),
        toml::Value::String(name) => match DEVICE_NAMES.iter().position(|n| n == name) {
            Some(index) => Some(index as u16 + 1),
            None => {
                errors.push(format!("{}: unknown device {}", context, value));
                None
            }
        },
        _ => {
            errors.push(format!("{}: unknown device {}", context, value));
            None
        }
    }
}

fn parse_pin(value: &str) -> Option<u8> {
    let value = value.strip_prefix('^').unwrap_or(value);
    let pin: u8 = value.strip_prefix("gpio")?.parse().ok()?;
    (pin < 30).then_some(pin)
}

fn fail(errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: Invalid link.toml                                        ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
