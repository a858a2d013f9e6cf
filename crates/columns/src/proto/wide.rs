//! 256-bit integers
//!
//! Stored as two 128-bit halves; the wire layout is the low half followed by
//! the high half, each little-endian.

/// Signed 256-bit integer (two's complement)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Int256 {
    pub low: u128,
    pub high: u128,
}

impl Int256 {
    pub const fn new(high: u128, low: u128) -> Self {
        Self { low, high }
    }

    /// Sign-extend a 64-bit integer
    pub const fn from_i64(v: i64) -> Self {
        Self {
            low: v as i128 as u128,
            high: if v < 0 { u128::MAX } else { 0 },
        }
    }

    pub fn to_le_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[..16].copy_from_slice(&self.low.to_le_bytes());
        out[16..].copy_from_slice(&self.high.to_le_bytes());
        out
    }
}

/// Unsigned 256-bit integer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UInt256 {
    pub low: u128,
    pub high: u128,
}

impl UInt256 {
    pub const fn new(high: u128, low: u128) -> Self {
        Self { low, high }
    }

    /// Zero-extend a 64-bit integer
    pub const fn from_u64(v: u64) -> Self {
        Self {
            low: v as u128,
            high: 0,
        }
    }

    pub fn to_le_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[..16].copy_from_slice(&self.low.to_le_bytes());
        out[16..].copy_from_slice(&self.high.to_le_bytes());
        out
    }
}
