//! Chute - Columns
//!
//! Typed ClickHouse column encoding for loosely typed JSON input.
//!
//! # Architecture
//!
//! ```text
//! record ─► ColumnSet ─► Column::append (per field) ─► buffers
//!                │
//!                └─ flush ─► Block { rows, [name, type, bytes] } ─► transport
//! ```
//!
//! - [`node`]: the input value contract (`as_str`, `as_int`, presence)
//! - [`proto`]: primitive column buffers in ClickHouse native layout
//! - [`column`]: per-column adapters with one-time nullability
//! - [`schema`]: column definitions parsed from ClickHouse type strings
//! - [`set`]: row-aligned column sets and native blocks
//!
//! # Example
//!
//! ```
//! use chute_columns::{ColumnSet, ColumnSpec};
//! use serde_json::json;
//!
//! let specs = vec![
//!     ColumnSpec::parse("id", "Int32").unwrap(),
//!     ColumnSpec::parse("name", "Nullable(String)").unwrap(),
//! ];
//! let mut set = ColumnSet::new(&specs);
//!
//! set.append_record(&json!({"id": 1, "name": "a"})).unwrap();
//! set.append_record(&json!({"id": 2})).unwrap();
//! assert!(set.append_record(&json!({"name": "c"})).is_err());
//!
//! let block = set.flush();
//! assert_eq!(block.rows, 2);
//! assert_eq!(set.rows(), 0);
//! ```

pub mod column;
mod error;
pub mod node;
pub mod proto;
pub mod schema;
pub mod set;

pub use column::{Column, ColumnAdapter, ElementKind};
pub use error::{AppendError, RecordError, SchemaError};
pub use node::{InputNode, NodeError, NodeShape, Record};
pub use proto::ColumnType;
pub use schema::ColumnSpec;
pub use set::{Block, ColumnSet, EncodedColumn};
