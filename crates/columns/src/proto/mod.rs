//! Primitive ClickHouse column buffers
//!
//! Append-only, in-memory column buffers that serialize to the ClickHouse
//! native block layout (the same bytes `FORMAT Native` carries over HTTP).
//!
//! # Layouts
//!
//! | Column | Bytes per row |
//! |--------|---------------|
//! | `Int8`..`UInt256`, `Float32`, `Float64` | fixed width, little-endian |
//! | `String` | uvarint length + UTF-8 bytes |
//! | `Enum8` / `Enum16` | `i8` / `i16` code, little-endian |
//! | `Nullable(T)` | null map (1 byte/row, `1` = null), then `T` |

mod enums;
mod fixed;
mod nullable;
mod string;
mod wide;

use std::fmt;

use bytes::{BufMut, BytesMut};

pub use enums::{ColEnum, EnumDictionary, EnumWidth};
pub use fixed::{ColFixed, Fixed};
pub use nullable::ColNullable;
pub use string::ColStr;
pub use wide::{Int256, UInt256};

// =============================================================================
// Column Type
// =============================================================================

/// Wire type tag of a column, as written in the native block header
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnType(String);

impl ColumnType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Wrap this type in `Nullable(...)`
    pub fn nullable(&self) -> Self {
        Self(format!("Nullable({})", self.0))
    }

    pub fn is_nullable(&self) -> bool {
        self.0.starts_with("Nullable(")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// Column Traits
// =============================================================================

/// Read side of a column: what a block needs to put it on the wire
pub trait ColInput {
    /// Number of rows currently buffered
    fn rows(&self) -> usize;

    /// Wire type tag
    fn column_type(&self) -> ColumnType;

    /// Append the column data to `buf` in native layout
    fn encode_column(&self, buf: &mut BytesMut);

    /// Drop all rows, keeping allocations
    fn reset(&mut self);
}

/// Write side of a column
pub trait ColumnBuffer: ColInput {
    type Item;

    fn push(&mut self, item: Self::Item);

    /// Drop every row at index `rows` and above
    fn truncate(&mut self, rows: usize);
}

// =============================================================================
// Wire helpers
// =============================================================================

/// Write an unsigned LEB128 integer
#[inline]
pub fn put_uvarint(buf: &mut BytesMut, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value as u8) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Write a uvarint-prefixed byte string
#[inline]
pub fn put_string(buf: &mut BytesMut, s: &str) {
    put_uvarint(buf, s.len() as u64);
    buf.put_slice(s.as_bytes());
}
