//! Fixed-width columns (integers and floats)

use bytes::{BufMut, BytesMut};

use super::wide::{Int256, UInt256};
use super::{ColInput, ColumnBuffer, ColumnType};

/// A value with a fixed-width little-endian wire encoding
pub trait Fixed: Copy + Default {
    /// ClickHouse type name
    const TYPE_NAME: &'static str;

    fn put(self, buf: &mut BytesMut);
}

macro_rules! impl_fixed {
    ($($ty:ty => $name:literal, $put:ident;)*) => {
        $(
            impl Fixed for $ty {
                const TYPE_NAME: &'static str = $name;

                #[inline]
                fn put(self, buf: &mut BytesMut) {
                    buf.$put(self);
                }
            }
        )*
    };
}

impl_fixed! {
    i8 => "Int8", put_i8;
    i16 => "Int16", put_i16_le;
    i32 => "Int32", put_i32_le;
    i64 => "Int64", put_i64_le;
    i128 => "Int128", put_i128_le;
    u8 => "UInt8", put_u8;
    u16 => "UInt16", put_u16_le;
    u32 => "UInt32", put_u32_le;
    u64 => "UInt64", put_u64_le;
    u128 => "UInt128", put_u128_le;
    f32 => "Float32", put_f32_le;
    f64 => "Float64", put_f64_le;
}

impl Fixed for Int256 {
    const TYPE_NAME: &'static str = "Int256";

    #[inline]
    fn put(self, buf: &mut BytesMut) {
        buf.put_slice(&self.to_le_bytes());
    }
}

impl Fixed for UInt256 {
    const TYPE_NAME: &'static str = "UInt256";

    #[inline]
    fn put(self, buf: &mut BytesMut) {
        buf.put_slice(&self.to_le_bytes());
    }
}

/// Column of fixed-width values
#[derive(Debug, Clone, PartialEq)]
pub struct ColFixed<T: Fixed> {
    values: Vec<T>,
}

impl<T: Fixed> ColFixed<T> {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: Fixed> Default for ColFixed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Fixed> ColInput for ColFixed<T> {
    fn rows(&self) -> usize {
        self.values.len()
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::new(T::TYPE_NAME)
    }

    fn encode_column(&self, buf: &mut BytesMut) {
        buf.reserve(self.values.len() * std::mem::size_of::<T>());
        for v in &self.values {
            v.put(buf);
        }
    }

    fn reset(&mut self) {
        self.values.clear();
    }
}

impl<T: Fixed> ColumnBuffer for ColFixed<T> {
    type Item = T;

    #[inline]
    fn push(&mut self, item: T) {
        self.values.push(item);
    }

    fn truncate(&mut self, rows: usize) {
        self.values.truncate(rows);
    }
}
