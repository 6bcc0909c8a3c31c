//! Coordinator task
//!
//! Polls the registered devices one at a time through the roster, logs
//! every value they send back and reports availability changes. Link
//! statistics are logged periodically.

use defmt::*;
use embassy_futures::select::{select3, Either3};
use embassy_time::{Duration, Instant, Ticker, Timer};

use bitlink_core::{LinkReceiver, Roster, RosterEvent, StatusLed};
use bitlink_hal_rp2040::LedPin;
use bitlink_protocol::DeviceId;

use crate::channels::{Outbound, FRAME_READY, LINK, QUEUE_DEPTH, TX_REQUESTS};

/// Link statistics log interval
const STATS_INTERVAL_S: u64 = 10;

/// Roster check interval while idle
const ROSTER_TICK_MS: u64 = 50;

#[embassy_executor::task]
pub async fn coordinator_task(
    receiver: LinkReceiver<'static, QUEUE_DEPTH>,
    mut roster: Roster,
    mut led: StatusLed<LedPin<'static>>,
) {
    info!(
        "Coordinator task started: {} devices, reply window {} ms",
        roster.devices().len(),
        roster.reply_window_ms()
    );

    let start = Instant::now();
    let mut stats_ticker = Ticker::every(Duration::from_secs(STATS_INTERVAL_S));

    loop {
        let now_ms = start.elapsed().as_millis() as u32;

        while let Some(frame) = receiver.poll() {
            led.toggle();
            match frame.as_value() {
                Some(value) => debug!("[{}] {} = {}", frame.recipient_id, frame.path, value),
                None => trace!("Request for {} ignored", frame.recipient_id),
            }
            if let Some(event) = roster.record_frame(&frame, now_ms) {
                log_event(event);
            }
        }

        if let Some(target) = roster.next_request(now_ms) {
            trace!("Requesting data from {}", target);
            TX_REQUESTS.send(Outbound::Request { target }).await;
        }
        while let Some(event) = roster.take_event() {
            log_event(event);
        }
        // Dark while no registered device answers
        if roster.online_count() == 0 {
            led.set_active(false);
        }

        match select3(
            FRAME_READY.wait(),
            Timer::after_millis(ROSTER_TICK_MS),
            stats_ticker.next(),
        )
        .await
        {
            Either3::Third(()) => {
                let stats = LINK.stats();
                info!(
                    "Link: {} accepted, {} rejected, {} abandoned, {} overruns, {} dropped, {} sent; {} devices online",
                    stats.accepted,
                    stats.rejected,
                    stats.abandoned,
                    stats.overruns,
                    stats.dropped,
                    stats.sent,
                    roster.online_count()
                );
            }
            Either3::First(()) | Either3::Second(()) => {}
        }
    }
}

fn log_event(event: RosterEvent) {
    match event {
        RosterEvent::Online(id) => match DeviceId::from_link_id(id) {
            Some(device) => info!("Device {} ({}) online", id, device.label()),
            None => info!("Device {} online", id),
        },
        RosterEvent::Offline(id) => warn!("Device {} offline, no reply", id),
    }
}
