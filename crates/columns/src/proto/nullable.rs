//! Nullable wrapper column

use bytes::{BufMut, BytesMut};

use super::{ColInput, ColumnBuffer, ColumnType};

/// `Nullable(T)` column: a null map plus the inner column
///
/// Null rows still occupy a slot in the inner column (holding the
/// element's default value) so both halves always have the same row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColNullable<C> {
    nulls: Vec<u8>,
    values: C,
}

impl<C> ColNullable<C>
where
    C: ColumnBuffer,
    C::Item: Default,
{
    pub fn new(values: C) -> Self {
        Self {
            nulls: Vec::new(),
            values,
        }
    }

    /// Append a null row
    #[inline]
    pub fn append_null(&mut self) {
        self.nulls.push(1);
        self.values.push(C::Item::default());
    }

    /// Append a present row
    #[inline]
    pub fn append_value(&mut self, value: C::Item) {
        self.nulls.push(0);
        self.values.push(value);
    }

    /// Whether row `i` is null (`None` when out of range)
    pub fn is_null(&self, i: usize) -> Option<bool> {
        self.nulls.get(i).map(|&b| b == 1)
    }

    pub fn inner(&self) -> &C {
        &self.values
    }
}

impl<C> ColInput for ColNullable<C>
where
    C: ColumnBuffer,
    C::Item: Default,
{
    fn rows(&self) -> usize {
        self.nulls.len()
    }

    fn column_type(&self) -> ColumnType {
        self.values.column_type().nullable()
    }

    fn encode_column(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.nulls);
        self.values.encode_column(buf);
    }

    fn reset(&mut self) {
        self.nulls.clear();
        self.values.reset();
    }
}

impl<C> ColumnBuffer for ColNullable<C>
where
    C: ColumnBuffer,
    C::Item: Default,
{
    type Item = Option<C::Item>;

    #[inline]
    fn push(&mut self, item: Option<C::Item>) {
        match item {
            Some(v) => self.append_value(v),
            None => self.append_null(),
        }
    }

    fn truncate(&mut self, rows: usize) {
        self.nulls.truncate(rows);
        self.values.truncate(rows);
    }
}
