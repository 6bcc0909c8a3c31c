//! Measurement point path
//!
//! A path such as `/dht22/temperature` names the measurement point a value
//! belongs to. On the wire it is a fixed-size, NUL-terminated byte field.

/// Size of the path field in bytes, including the terminating NUL
pub const PATH_SIZE: usize = 32;

/// Fixed-size, NUL-padded path field
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Path([u8; PATH_SIZE]);

impl Path {
    /// The all-zero path carried by request frames
    pub const EMPTY: Self = Self([0; PATH_SIZE]);

    /// Longest path that fits together with its terminator
    pub const MAX_LEN: usize = PATH_SIZE - 1;

    /// Build a path from a string
    ///
    /// A path longer than [`Path::MAX_LEN`] bytes is zeroed entirely rather
    /// than truncated, so a cut-off path never names a different point.
    pub fn new(path: &str) -> Self {
        let bytes = path.as_bytes();
        if bytes.len() > Self::MAX_LEN {
            return Self::EMPTY;
        }
        let mut raw = [0u8; PATH_SIZE];
        raw[..bytes.len()].copy_from_slice(bytes);
        Self(raw)
    }

    /// Wrap a raw field exactly as received
    pub const fn from_raw(raw: [u8; PATH_SIZE]) -> Self {
        Self(raw)
    }

    /// Raw wire field
    pub const fn raw(&self) -> &[u8; PATH_SIZE] {
        &self.0
    }

    /// Path bytes up to (not including) the first NUL
    ///
    /// A received field without a terminator yields all [`PATH_SIZE`] bytes.
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(PATH_SIZE);
        &self.0[..end]
    }

    /// Path as UTF-8, if valid
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.as_bytes()).ok()
    }

    /// Length in bytes (up to the first NUL)
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl core::fmt::Debug for Path {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "{:?}", s),
            None => write!(f, "{:?}", self.as_bytes()),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Path {
    fn format(&self, f: defmt::Formatter) {
        match self.as_str() {
            Some(s) => defmt::write!(f, "{=str}", s),
            None => defmt::write!(f, "{=[u8]}", self.as_bytes()),
        }
    }
}
