//! Column set: one adapter per destination column
//!
//! Drives every column with the matching field of each record and cuts the
//! buffered rows into a [`Block`] at batch boundaries.
//!
//! # Row alignment
//!
//! Row *i* of every column belongs to record *i*. When a column rejects its
//! field, the columns that already took a value for that record are
//! truncated back, so a rejected record leaves no trace in any column.

use bytes::{BufMut, Bytes, BytesMut};

use crate::column::{Column, ColumnAdapter};
use crate::error::RecordError;
use crate::node::Record;
use crate::proto::{ColumnType, put_string, put_uvarint};
use crate::schema::ColumnSpec;

#[derive(Debug, Clone)]
struct NamedColumn {
    name: String,
    column: Column,
}

/// Ordered, name-addressed column adapters for one destination table
#[derive(Debug, Clone)]
pub struct ColumnSet {
    columns: Vec<NamedColumn>,
    rows: usize,
}

impl ColumnSet {
    pub fn new(specs: &[ColumnSpec]) -> Self {
        let columns = specs
            .iter()
            .map(|spec| NamedColumn {
                name: spec.name.clone(),
                column: Column::with_nullable(spec.kind.clone(), spec.nullable),
            })
            .collect();

        Self { columns, rows: 0 }
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Rows committed since the last reset
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Columns in order, with their names
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|c| (c.name.as_str(), &c.column))
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.column)
    }

    /// Append one record as one row of every column
    ///
    /// On error nothing from this record stays buffered.
    pub fn append_record<R: Record + ?Sized>(&mut self, record: &R) -> Result<(), RecordError> {
        for i in 0..self.columns.len() {
            let col = &mut self.columns[i];
            if let Err(source) = col.column.append(record.field(&col.name)) {
                let column = col.name.clone();
                self.rollback(i);
                return Err(RecordError { column, source });
            }
        }
        self.rows += 1;
        Ok(())
    }

    /// Truncate columns `..upto` back to the committed row count
    fn rollback(&mut self, upto: usize) {
        let rows = self.rows;
        for col in &mut self.columns[..upto] {
            col.column.truncate(rows);
        }
    }

    /// Encode every column without clearing anything
    pub fn encode(&self) -> Block {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let mut data = BytesMut::new();
                c.column.encode_column(&mut data);
                EncodedColumn {
                    name: c.name.clone(),
                    column_type: c.column.column_type(),
                    data: data.freeze(),
                }
            })
            .collect();

        Block {
            rows: self.rows,
            columns,
        }
    }

    /// Clear every column for the next batch
    pub fn reset(&mut self) {
        for c in &mut self.columns {
            c.column.reset();
        }
        self.rows = 0;
    }

    /// Encode, then reset
    pub fn flush(&mut self) -> Block {
        let block = self.encode();
        self.reset();
        block
    }
}

/// One encoded column of a block
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedColumn {
    pub name: String,
    pub column_type: ColumnType,
    pub data: Bytes,
}

/// Encoded batch: row count plus every column's type and bytes
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub rows: usize,
    pub columns: Vec<EncodedColumn>,
}

impl Block {
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Encoded size of the column data, excluding headers
    pub fn data_len(&self) -> usize {
        self.columns.iter().map(|c| c.data.len()).sum()
    }

    /// Write the block in `Native` format
    ///
    /// ```text
    /// uvarint columns | uvarint rows | per column: name, type, data
    /// ```
    pub fn encode_native(&self, buf: &mut BytesMut) {
        buf.reserve(self.data_len() + 16 + self.columns.len() * 32);
        put_uvarint(buf, self.columns.len() as u64);
        put_uvarint(buf, self.rows as u64);
        for col in &self.columns {
            put_string(buf, &col.name);
            put_string(buf, col.column_type.as_str());
            buf.put_slice(&col.data);
        }
    }

    /// `Native` body as a single buffer
    pub fn to_native(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode_native(&mut buf);
        buf.freeze()
    }
}

#[cfg(test)]
#[path = "set_test.rs"]
mod set_test;
