//! Reassembly task: the background context
//!
//! Wakes when the link task reports a complete frame, and at least twice
//! per bit period otherwise so stale partial frames are abandoned on time.

use defmt::*;
use embassy_futures::select::select;
use embassy_time::Timer;

use bitlink_core::{Reassembler, Reassembly};

use crate::channels::{FRAME_COMPLETE, FRAME_READY, QUEUE_DEPTH};
use crate::tasks::link::now_us;

#[embassy_executor::task]
pub async fn reassembly_task(reassembler: Reassembler<'static, QUEUE_DEPTH>, interval_us: u32) {
    info!("Reassembly task started, interval {} us", interval_us);

    loop {
        select(FRAME_COMPLETE.wait(), Timer::after_micros(interval_us as u64)).await;

        match reassembler.service(now_us()) {
            Reassembly::Accepted => FRAME_READY.signal(()),
            Reassembly::Rejected => trace!("Frame not for us, discarded"),
            Reassembly::Dropped => warn!("Link queue full, frame dropped"),
            Reassembly::Abandoned => debug!("Partial frame went stale, discarded"),
            Reassembly::Idle | Reassembly::Receiving => {}
        }
    }
}
