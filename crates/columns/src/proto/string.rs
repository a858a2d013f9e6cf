//! String column

use bytes::{BufMut, BytesMut};

use super::{ColInput, ColumnBuffer, ColumnType, put_uvarint};

/// Column of strings
///
/// Rows are kept in one contiguous byte buffer with end offsets, so a batch
/// of short log fields does not allocate per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColStr {
    buf: Vec<u8>,
    ends: Vec<usize>,
}

impl ColStr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(rows: usize, bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
            ends: Vec::with_capacity(rows),
        }
    }

    /// Append a borrowed string
    #[inline]
    pub fn append(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
        self.ends.push(self.buf.len());
    }

    /// Bytes of row `i`
    pub fn row(&self, i: usize) -> Option<&str> {
        let end = *self.ends.get(i)?;
        let start = if i == 0 { 0 } else { self.ends[i - 1] };
        // Rows are only ever appended from `&str`, so every slice is valid UTF-8.
        std::str::from_utf8(&self.buf[start..end]).ok()
    }
}

impl ColInput for ColStr {
    fn rows(&self) -> usize {
        self.ends.len()
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::new("String")
    }

    fn encode_column(&self, buf: &mut BytesMut) {
        buf.reserve(self.buf.len() + self.ends.len());
        let mut start = 0;
        for &end in &self.ends {
            put_uvarint(buf, (end - start) as u64);
            buf.put_slice(&self.buf[start..end]);
            start = end;
        }
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.ends.clear();
    }
}

impl ColumnBuffer for ColStr {
    type Item = String;

    #[inline]
    fn push(&mut self, item: String) {
        self.append(&item);
    }

    fn truncate(&mut self, rows: usize) {
        if rows >= self.ends.len() {
            return;
        }
        let keep = if rows == 0 { 0 } else { self.ends[rows - 1] };
        self.ends.truncate(rows);
        self.buf.truncate(keep);
    }
}
