//! Link task: the edge context
//!
//! Owns the link lines. Waits for either a strobe edge, which it samples
//! into the shared receive state, or an outbound frame, which it transmits.
//! A transmission blocks the executor for the frame duration.
//!
//! Transmitting while a frame is arriving would abandon that frame and
//! collide with its sender, so outbound frames wait until the receive
//! state is idle or holds a complete frame. A stalled partial frame is
//! abandoned by the reassembly task after the frame gap, which bounds the
//! wait.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Delay, Instant, Timer};

use bitlink_core::{SampleOutcome, Transport};
use bitlink_hal_rp2040::FlexLines;

use crate::channels::{Outbound, FRAME_COMPLETE, QUEUE_DEPTH, TX_REQUESTS};

/// The firmware's transport
pub type LinkTransport = Transport<'static, FlexLines<'static>, Delay, QUEUE_DEPTH>;

/// Wrapping microsecond timestamp for the sampler
pub fn now_us() -> u32 {
    Instant::now().as_micros() as u32
}

#[embassy_executor::task]
pub async fn link_task(mut transport: LinkTransport) {
    info!(
        "Link task started: id={}, bit period {} us",
        transport.own_id(),
        transport.timing().bit_period_us()
    );

    let retry_us = transport.timing().bit_period_us() as u64;
    let mut deferred: Option<Outbound> = None;

    loop {
        if let Some(msg) = deferred.take() {
            if can_transmit(&transport) {
                transmit(&mut transport, msg);
                continue;
            }
            deferred = Some(msg);
        }

        let waiting = deferred.is_some();
        let next_outbound = async {
            if waiting {
                Timer::after_micros(retry_us).await;
                None
            } else {
                Some(TX_REQUESTS.receive().await)
            }
        };

        match select(transport.lines_mut().wait_for_strobe(), next_outbound).await {
            Either::First(()) => match transport.sample_edge(now_us()) {
                SampleOutcome::Complete => FRAME_COMPLETE.signal(()),
                SampleOutcome::Overrun => trace!("Edge after complete frame ignored"),
                SampleOutcome::Stored | SampleOutcome::Suspended => {}
            },
            Either::Second(Some(msg)) => {
                if can_transmit(&transport) {
                    transmit(&mut transport, msg);
                } else {
                    debug!("Receiving, deferring {}", msg);
                    deferred = Some(msg);
                }
            }
            Either::Second(None) => {}
        }
    }
}

/// No frame is partially received
fn can_transmit(transport: &LinkTransport) -> bool {
    let state = transport.state();
    state.is_idle() || state.is_complete()
}

fn transmit(transport: &mut LinkTransport, msg: Outbound) {
    match msg {
        Outbound::Value { path, value } => {
            trace!("TX {} = {}", path, value);
            transport.send(path, value);
        }
        Outbound::Request { target } => {
            trace!("TX request to {}", target);
            transport.send_request(target);
        }
    }
}
