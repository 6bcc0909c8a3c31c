//! Receive address filter
//!
//! Decides from the header alone whether a fully sampled frame concerns
//! this device:
//!
//! - a device accepts requests addressed to its own id
//! - the coordinator (id 0) accepts every value frame, whatever the address
//!
//! Everything else, including frames with an unknown kind, is dropped.

use bitlink_protocol::{FrameHeader, Kind, COORDINATOR_ID};

/// Whether a frame with `header` is accepted by a device with `own_id`
pub fn accepts(own_id: u16, header: &FrameHeader) -> bool {
    match header.kind {
        Kind::RequestOnly => header.recipient_id == own_id,
        Kind::Unknown => false,
        _ => own_id == COORDINATOR_ID,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(recipient_id: u16, kind: Kind) -> FrameHeader {
        FrameHeader { recipient_id, kind }
    }

    #[test]
    fn test_request_to_self_accepted() {
        assert!(accepts(7, &header(7, Kind::RequestOnly)));
    }

    #[test]
    fn test_request_to_other_rejected() {
        assert!(!accepts(3, &header(7, Kind::RequestOnly)));
        assert!(!accepts(0, &header(7, Kind::RequestOnly)));
    }

    #[test]
    fn test_coordinator_accepts_all_values() {
        for kind in [Kind::Float, Kind::Double, Kind::Int64, Kind::Uint64] {
            assert!(accepts(0, &header(5, kind)));
            assert!(accepts(0, &header(0, kind)));
        }
    }

    #[test]
    fn test_device_rejects_values() {
        // Even when the address matches, a device only takes requests
        assert!(!accepts(5, &header(5, Kind::Float)));
        assert!(!accepts(5, &header(0, Kind::Uint64)));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(!accepts(0, &header(0, Kind::Unknown)));
        assert!(!accepts(4, &header(4, Kind::Unknown)));
    }
}
