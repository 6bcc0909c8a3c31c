//! Coordinator polling roster
//!
//! The link itself has no notion of a device being present: a device that
//! never answers is just an empty `poll()`. The roster layers that on top.
//! The coordinator requests each registered device in turn, keeps a reply
//! window open after every request and counts the windows that close
//! without an answer.

use heapless::Vec;

use bitlink_protocol::{Frame, COORDINATOR_ID};

/// Registered devices per coordinator
pub const MAX_DEVICES: usize = 8;

/// Unanswered requests before a device is considered offline
pub const MAX_MISSED_REPLIES: u8 = 3;

// One unreported-offline bit per device slot
const _: () = assert!(MAX_DEVICES <= u8::BITS as usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RosterError {
    /// Roster already holds [`MAX_DEVICES`]
    Full,
    /// Id already registered
    Duplicate,
    /// Id 0 belongs to the coordinator
    Reserved,
}

/// Availability change of a registered device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RosterEvent {
    Online(u16),
    Offline(u16),
}

/// Availability of one registered device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceStatus {
    pub id: u16,
    /// Heard from since it last went offline
    pub online: bool,
    /// Consecutive reply windows closed without a frame from it
    pub missed: u8,
    /// Time of the last frame from it
    pub last_seen_ms: Option<u32>,
}

/// Request in flight
#[derive(Debug, Clone, Copy)]
struct Pending {
    index: usize,
    sent_ms: u32,
    answered: bool,
}

/// Round-robin request scheduler with availability tracking
#[derive(Debug, Clone)]
pub struct Roster {
    devices: Vec<DeviceStatus, MAX_DEVICES>,
    reply_window_ms: u32,
    cursor: usize,
    pending: Option<Pending>,
    /// Devices whose offline transition has not been taken yet, by index
    unreported: u8,
}

impl Roster {
    pub fn new(reply_window_ms: u32) -> Self {
        Self {
            devices: Vec::new(),
            reply_window_ms,
            cursor: 0,
            pending: None,
            unreported: 0,
        }
    }

    /// Register a device; it starts offline until it first answers
    pub fn add(&mut self, id: u16) -> Result<(), RosterError> {
        if id == COORDINATOR_ID {
            return Err(RosterError::Reserved);
        }
        if self.devices.iter().any(|d| d.id == id) {
            return Err(RosterError::Duplicate);
        }
        self.devices
            .push(DeviceStatus {
                id,
                online: false,
                missed: 0,
                last_seen_ms: None,
            })
            .map_err(|_| RosterError::Full)
    }

    /// Id of the device to request next, if no reply window is open
    ///
    /// Closing a window that got no answer counts a miss against the
    /// requested device; the miss that reaches [`MAX_MISSED_REPLIES`] leaves
    /// a [`RosterEvent::Offline`] for [`Roster::take_event`].
    pub fn next_request(&mut self, now_ms: u32) -> Option<u16> {
        if let Some(pending) = self.pending {
            if now_ms.wrapping_sub(pending.sent_ms) < self.reply_window_ms {
                return None;
            }
            self.close_window(pending);
        }

        if self.devices.is_empty() {
            return None;
        }

        let index = self.cursor % self.devices.len();
        self.cursor = (index + 1) % self.devices.len();
        self.pending = Some(Pending {
            index,
            sent_ms: now_ms,
            answered: false,
        });
        Some(self.devices[index].id)
    }

    fn close_window(&mut self, pending: Pending) {
        self.pending = None;
        if pending.answered {
            return;
        }

        let device = &mut self.devices[pending.index];
        device.missed = device.missed.saturating_add(1);
        if device.online && device.missed >= MAX_MISSED_REPLIES {
            device.online = false;
            self.unreported |= 1 << pending.index;
        }
    }

    /// Note a received frame
    ///
    /// Value frames carry their sender's id. Returns [`RosterEvent::Online`]
    /// when a device is heard from while offline. Requests and unknown ids
    /// are ignored.
    pub fn record_frame(&mut self, frame: &Frame, now_ms: u32) -> Option<RosterEvent> {
        if frame.is_request() {
            return None;
        }

        let index = self
            .devices
            .iter()
            .position(|d| d.id == frame.recipient_id)?;

        if let Some(pending) = self.pending.as_mut() {
            if pending.index == index {
                pending.answered = true;
            }
        }

        // A device back before its offline transition was taken never
        // reports the stale one
        self.unreported &= !(1 << index);

        let device = &mut self.devices[index];
        device.missed = 0;
        device.last_seen_ms = Some(now_ms);
        if device.online {
            None
        } else {
            device.online = true;
            Some(RosterEvent::Online(device.id))
        }
    }

    /// Next offline transition not yet taken, lowest device slot first
    ///
    /// Each device holds at most one, so none is lost however long the
    /// caller waits to drain them.
    pub fn take_event(&mut self) -> Option<RosterEvent> {
        if self.unreported == 0 {
            return None;
        }
        let index = self.unreported.trailing_zeros() as usize;
        self.unreported &= !(1 << index);
        Some(RosterEvent::Offline(self.devices[index].id))
    }

    pub fn devices(&self) -> &[DeviceStatus] {
        &self.devices
    }

    pub fn status(&self, id: u16) -> Option<&DeviceStatus> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn is_online(&self, id: u16) -> bool {
        self.status(id).map(|d| d.online).unwrap_or(false)
    }

    pub fn online_count(&self) -> usize {
        self.devices.iter().filter(|d| d.online).count()
    }

    pub fn reply_window_ms(&self) -> u32 {
        self.reply_window_ms
    }
}
