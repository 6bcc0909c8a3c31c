//! Bitlink - telemetry over a two-wire bit link
//!
//! Firmware for RP2040 boards at either end of a bit-link. The same image
//! runs as the coordinator (own_id 0), which polls sensor devices and logs
//! their values, or as a sensor device, which answers requests addressed to
//! it. The role and pins come from `link.toml`.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::AnyPin;
use embassy_rp::Peri;
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use bitlink_core::{parse_config, LinkConfig, PinConfig, Roster, StatusLed, Transport};
use bitlink_hal_rp2040::gpio::pull_for;
use bitlink_hal_rp2040::{FlexLines, LedPin, PinBank};

use crate::channels::{LINK, QUEUE};

/// Embedded link configuration (compiled into firmware)
/// Edit link.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../link.toml");

mod channels;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Bitlink firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    let mut pins = PinBank::from_peripherals(p);

    let signal = take_link_pin(&mut pins, &config.signal_pin, "signal");
    let data = take_link_pin(&mut pins, &config.data_pin, "data");
    let led = match config.led_pin {
        Some(led_pin) => match pins.take(led_pin.pin) {
            Ok(pin) => StatusLed::new(LedPin::new(pin)),
            Err(e) => {
                warn!("LED pin gpio{} unavailable: {}", led_pin.pin, e);
                StatusLed::disabled()
            }
        },
        None => StatusLed::disabled(),
    };

    let lines = FlexLines::new(
        signal,
        data,
        pull_for(&config.signal_pin),
        pull_for(&config.data_pin),
    );
    let mut transport: tasks::LinkTransport =
        Transport::new(&LINK, &QUEUE, lines, Delay, config.timing);
    transport.configure(config.own_id);
    info!(
        "Link on gpio{}/gpio{}, own id {}",
        config.signal_pin.pin, config.data_pin.pin, config.own_id
    );

    let reassembler = transport.reassembler();
    let receiver = transport.receiver();
    let interval_us = config.timing.reassembly_interval_us();

    spawner.spawn(tasks::link_task(transport)).unwrap();
    spawner
        .spawn(tasks::reassembly_task(reassembler, interval_us))
        .unwrap();

    if config.is_coordinator() {
        let roster = build_roster(&config);
        spawner
            .spawn(tasks::coordinator_task(receiver, roster, led))
            .unwrap();
    } else {
        spawner
            .spawn(tasks::device_task(receiver, config.own_id, led))
            .unwrap();
    }

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse the embedded link.toml, falling back to defaults
fn load_config() -> LinkConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            warn!("Failed to parse embedded config: {}", e);
            warn!("Using default link configuration");
            LinkConfig::default()
        }
    }
}

/// Take a link line pin; the link cannot run without it
fn take_link_pin(pins: &mut PinBank, config: &PinConfig, name: &str) -> Peri<'static, AnyPin> {
    match pins.take(config.pin) {
        Ok(pin) => pin,
        Err(e) => defmt::panic!("{} pin gpio{} unavailable: {}", name, config.pin, e),
    }
}

fn build_roster(config: &LinkConfig) -> Roster {
    match config.roster() {
        Ok(roster) => roster,
        Err(e) => {
            warn!("Invalid roster ({}), polling no devices", e);
            Roster::new(config.reply_window_ms)
        }
    }
}
