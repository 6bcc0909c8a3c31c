//! Sensor device task
//!
//! Answers every request addressed to this device with its telemetry:
//!
//! - `/<name>/uptime`: seconds since boot
//! - `/<name>/frames`: frames accepted by the link so far

use core::fmt::Write;

use defmt::*;
use embassy_time::Instant;
use heapless::String;

use bitlink_core::{LinkReceiver, StatusLed};
use bitlink_hal_rp2040::LedPin;
use bitlink_protocol::{DeviceId, Path, Value, PATH_SIZE};

use crate::channels::{Outbound, FRAME_READY, LINK, QUEUE_DEPTH, TX_REQUESTS};

/// Path segment for devices outside the catalogue
const FALLBACK_NAME: &str = "device";

#[embassy_executor::task]
pub async fn device_task(
    receiver: LinkReceiver<'static, QUEUE_DEPTH>,
    own_id: u16,
    mut led: StatusLed<LedPin<'static>>,
) {
    let name = match DeviceId::from_link_id(own_id) {
        Some(device) => {
            info!("Device task started as {} ({})", device.name(), device.label());
            device.name()
        }
        None => {
            warn!("Link id {} is not in the device catalogue", own_id);
            FALLBACK_NAME
        }
    };

    loop {
        FRAME_READY.wait().await;

        while let Some(frame) = receiver.poll() {
            led.toggle();
            if !frame.is_request() {
                continue;
            }

            debug!("Request received, replying");
            let uptime_s = Instant::now().as_secs();
            let frames = LINK.stats().accepted as u64;

            TX_REQUESTS
                .send(Outbound::Value {
                    path: telemetry_path(name, "uptime"),
                    value: Value::Uint64(uptime_s),
                })
                .await;
            TX_REQUESTS
                .send(Outbound::Value {
                    path: telemetry_path(name, "frames"),
                    value: Value::Uint64(frames),
                })
                .await;
        }
    }
}

/// `/<device>/<field>`; empty if it does not fit a frame
fn telemetry_path(device: &str, field: &str) -> Path {
    let mut path: String<PATH_SIZE> = String::new();
    match write!(path, "/{}/{}", device, field) {
        Ok(()) => Path::new(&path),
        Err(_) => Path::EMPTY,
    }
}
