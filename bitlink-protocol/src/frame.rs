//! Frame encoding and decoding for the bit-link protocol.
//!
//! Frame format (fixed size, identical for every kind):
//! - RECIPIENT_ID (2 bytes, LE): target address; 0 is the coordinator
//! - KIND (1 byte): [`Kind`] tag
//! - PATH ([`PATH_SIZE`] bytes): NUL-padded measurement path
//! - VALUE ([`VALUE_SIZE`] bytes, LE): typed value, meaningful per KIND

use crate::path::{Path, PATH_SIZE};
use crate::value::{Kind, Value, VALUE_SIZE};

/// Address of the coordinator (promiscuous receiver of value frames)
pub const COORDINATOR_ID: u16 = 0;

const RECIPIENT_OFFSET: usize = 0;
const KIND_OFFSET: usize = 2;
const PATH_OFFSET: usize = 3;
const VALUE_OFFSET: usize = PATH_OFFSET + PATH_SIZE;

/// Bytes needed before the receive filter can be evaluated
pub const HEADER_SIZE: usize = PATH_OFFSET;

/// Complete frame size in bytes
pub const FRAME_SIZE: usize = VALUE_OFFSET + VALUE_SIZE;

/// Complete frame size in bits
pub const FRAME_BITS: usize = FRAME_SIZE * 8;

/// Errors that can occur during frame decoding or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Not enough bytes for the requested view
    Incomplete,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Kind tag is not one of the known kinds
    UnknownKind(u8),
}

/// Frame contents beyond the address and path
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Payload {
    /// Bare request; path and value fields are zero
    Request,
    /// Typed telemetry value
    Value(Value),
}

/// A decoded or constructed frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Address field
    ///
    /// For requests this is the target device. Value frames carry the
    /// sending device's id, since the coordinator accepts them regardless.
    pub recipient_id: u16,
    /// Measurement path (empty for requests)
    pub path: Path,
    /// Request marker or typed value
    pub payload: Payload,
}

impl Frame {
    /// Create a value frame
    pub fn value(recipient_id: u16, path: impl Into<Path>, value: impl Into<Value>) -> Self {
        Self {
            recipient_id,
            path: path.into(),
            payload: Payload::Value(value.into()),
        }
    }

    /// Create a bare request addressed to `target_id`
    pub fn request(target_id: u16) -> Self {
        Self {
            recipient_id: target_id,
            path: Path::EMPTY,
            payload: Payload::Request,
        }
    }

    /// Kind tag of this frame
    pub fn kind(&self) -> Kind {
        match &self.payload {
            Payload::Request => Kind::RequestOnly,
            Payload::Value(v) => v.kind(),
        }
    }

    /// Typed value, if this is a value frame
    pub fn as_value(&self) -> Option<Value> {
        match self.payload {
            Payload::Value(v) => Some(v),
            Payload::Request => None,
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self.payload, Payload::Request)
    }

    /// Encode this frame into its fixed wire layout
    pub fn to_bytes(&self) -> [u8; FRAME_SIZE] {
        let mut out = [0u8; FRAME_SIZE];
        out[RECIPIENT_OFFSET..KIND_OFFSET].copy_from_slice(&self.recipient_id.to_le_bytes());
        out[KIND_OFFSET] = self.kind().as_byte();
        if let Payload::Value(value) = &self.payload {
            out[PATH_OFFSET..VALUE_OFFSET].copy_from_slice(self.path.raw());
            out[VALUE_OFFSET..].copy_from_slice(&value.to_bytes());
        }
        out
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written (always [`FRAME_SIZE`])
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        if buffer.len() < FRAME_SIZE {
            return Err(FrameError::BufferTooSmall);
        }
        buffer[..FRAME_SIZE].copy_from_slice(&self.to_bytes());
        Ok(FRAME_SIZE)
    }

    /// Decode a frame from its wire layout
    ///
    /// Fails on a short buffer or an unrecognised kind. Request frames
    /// ignore whatever the path and value fields hold.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let header = FrameHeader::peek(bytes)?;
        if bytes.len() < FRAME_SIZE {
            return Err(FrameError::Incomplete);
        }

        let payload = match header.kind {
            Kind::RequestOnly => {
                return Ok(Self::request(header.recipient_id));
            }
            Kind::Unknown => return Err(FrameError::UnknownKind(bytes[KIND_OFFSET])),
            kind => {
                let mut raw = [0u8; VALUE_SIZE];
                raw.copy_from_slice(&bytes[VALUE_OFFSET..FRAME_SIZE]);
                // Only value kinds reach this arm
                match Value::from_bytes(kind, &raw) {
                    Some(value) => Payload::Value(value),
                    None => return Err(FrameError::UnknownKind(bytes[KIND_OFFSET])),
                }
            }
        };

        let mut path = [0u8; PATH_SIZE];
        path.copy_from_slice(&bytes[PATH_OFFSET..VALUE_OFFSET]);

        Ok(Self {
            recipient_id: header.recipient_id,
            path: Path::from_raw(path),
            payload,
        })
    }
}

/// Address and kind, readable from the first [`HEADER_SIZE`] bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    pub recipient_id: u16,
    pub kind: Kind,
}

impl FrameHeader {
    /// View the header of a (possibly partial) frame without copying it
    pub fn peek(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < HEADER_SIZE {
            return Err(FrameError::Incomplete);
        }
        Ok(Self {
            recipient_id: u16::from_le_bytes([bytes[RECIPIENT_OFFSET], bytes[RECIPIENT_OFFSET + 1]]),
            kind: Kind::from_byte(bytes[KIND_OFFSET]),
        })
    }
}
