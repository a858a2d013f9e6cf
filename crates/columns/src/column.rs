//! Column adapters
//!
//! A [`Column`] turns one loosely typed input field per call into one row of
//! a width-exact ClickHouse column.
//!
//! # Nullability
//!
//! Every non-enum column owns two buffers for its element type: a plain one
//! and a `Nullable(...)` one. The `nullable` flag picks the active buffer
//! once, before the first append, and every operation reaches the buffers
//! through `Slot::active` / `Slot::active_mut`. The inactive buffer is
//! never written, so it never contributes rows, type or bytes.
//!
//! ```text
//! set_nullable(false)         set_nullable(true)
//!   append ─► plain             append ─► nullable (null map + values)
//!   rows/type/encode ◄─ plain   rows/type/encode ◄─ nullable
//! ```
//!
//! # Conversions
//!
//! | Column | Accessor | Conversion |
//! |--------|----------|------------|
//! | `Int8`..`Int64`, `UInt8`..`UInt64` | `as_int` | wrapping cast |
//! | `Int128`, `Int256` | `as_int` | sign extension |
//! | `UInt128`, `UInt256` | `as_int` | zero extension of the `u64` bit pattern |
//! | `Float32`, `Float64` | `as_int` | integer to float |
//! | `String` | `as_str` | copy |
//! | `Enum8`, `Enum16` | `as_str` | dictionary lookup |

use std::fmt;
use std::sync::Arc;

use bytes::BytesMut;

use crate::error::AppendError;
use crate::node::{InputNode, NodeError, NodeShape};
use crate::proto::{
    ColEnum, ColFixed, ColInput, ColNullable, ColStr, ColumnBuffer, ColumnType, EnumDictionary,
    Int256, UInt256,
};

// =============================================================================
// Element kinds
// =============================================================================

/// Element type of a column, fixed for the column's lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    Int256,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    UInt256,
    Float32,
    Float64,
    String,
    Enum(Arc<EnumDictionary>),
}

impl ElementKind {
    /// Whether columns of this kind can be made nullable
    pub fn supports_null(&self) -> bool {
        !matches!(self, Self::Enum(_))
    }

    /// ClickHouse type name of the non-null element
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Enum(dict) => dict.column_type(),
            other => ColumnType::new(other.scalar_name()),
        }
    }

    fn scalar_name(&self) -> &'static str {
        match self {
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Int128 => "Int128",
            Self::Int256 => "Int256",
            Self::UInt8 => "UInt8",
            Self::UInt16 => "UInt16",
            Self::UInt32 => "UInt32",
            Self::UInt64 => "UInt64",
            Self::UInt128 => "UInt128",
            Self::UInt256 => "UInt256",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::String => "String",
            Self::Enum(dict) => dict.width().as_str(),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_type())
    }
}

/// Element type with a column buffer and a conversion from input nodes
pub trait Element: Default + Sized {
    type Column: ColumnBuffer<Item = Self> + Default;

    fn from_node<N: InputNode + ?Sized>(node: &N) -> Result<Self, NodeError>;
}

macro_rules! int_element {
    ($($ty:ty => |$v:ident| $conv:expr;)*) => {
        $(
            impl Element for $ty {
                type Column = ColFixed<$ty>;

                #[inline]
                fn from_node<N: InputNode + ?Sized>(node: &N) -> Result<Self, NodeError> {
                    let $v = node.as_int()?;
                    Ok($conv)
                }
            }
        )*
    };
}

int_element! {
    i8 => |v| v as i8;
    i16 => |v| v as i16;
    i32 => |v| v as i32;
    i64 => |v| v;
    i128 => |v| v as i128;
    Int256 => |v| Int256::from_i64(v);
    u8 => |v| v as u8;
    u16 => |v| v as u16;
    u32 => |v| v as u32;
    u64 => |v| v as u64;
    u128 => |v| v as u64 as u128;
    UInt256 => |v| UInt256::from_u64(v as u64);
    f32 => |v| v as f32;
    f64 => |v| v as f64;
}

impl Element for String {
    type Column = ColStr;

    #[inline]
    fn from_node<N: InputNode + ?Sized>(node: &N) -> Result<Self, NodeError> {
        node.as_str().map(str::to_owned)
    }
}

// =============================================================================
// Adapter interface
// =============================================================================

/// Capabilities shared by every column adapter
pub trait ColumnAdapter {
    /// Choose the nullable buffer; only honoured before first use
    fn set_nullable(&mut self, enable: bool);

    /// Append one row; `None` is an absent value
    fn append<N: InputNode + ?Sized>(&mut self, node: Option<&N>) -> Result<(), AppendError>;

    /// Clear both buffers for the next batch
    fn reset(&mut self);

    /// Rows in the active buffer
    fn rows(&self) -> usize;

    /// Wire type tag of the active buffer
    fn column_type(&self) -> ColumnType;

    /// Serialize the active buffer
    fn encode_column(&self, buf: &mut BytesMut);
}

// =============================================================================
// Slot: plain + nullable buffers
// =============================================================================

enum ActiveMut<'a, C> {
    Plain(&'a mut C),
    Nullable(&'a mut ColNullable<C>),
}

/// Plain and nullable buffers for one element type, one of them active
#[derive(Debug, Clone)]
pub struct Slot<T: Element> {
    plain: T::Column,
    nulls: ColNullable<T::Column>,
    nullable: bool,
    configured: bool,
}

impl<T: Element> Default for Slot<T> {
    fn default() -> Self {
        Self {
            plain: T::Column::default(),
            nulls: ColNullable::new(T::Column::default()),
            nullable: false,
            configured: false,
        }
    }
}

impl<T: Element> Slot<T> {
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The buffer every read goes through
    fn active(&self) -> &dyn ColInput {
        if self.nullable {
            &self.nulls
        } else {
            &self.plain
        }
    }

    /// The buffer every write goes through
    fn active_mut(&mut self) -> ActiveMut<'_, T::Column> {
        if self.nullable {
            ActiveMut::Nullable(&mut self.nulls)
        } else {
            ActiveMut::Plain(&mut self.plain)
        }
    }

    pub(crate) fn truncate(&mut self, rows: usize) {
        self.plain.truncate(rows);
        self.nulls.truncate(rows);
    }
}

impl<T: Element> ColumnAdapter for Slot<T> {
    fn set_nullable(&mut self, enable: bool) {
        if self.configured {
            if enable != self.nullable {
                tracing::warn!(
                    column_type = %self.column_type(),
                    requested = enable,
                    "nullability is fixed after first use, ignoring"
                );
            }
            return;
        }
        self.nullable = enable;
        self.configured = true;
    }

    fn append<N: InputNode + ?Sized>(&mut self, node: Option<&N>) -> Result<(), AppendError> {
        self.configured = true;

        // Convert before touching any buffer
        let value = node.map(|n| T::from_node(n)).transpose()?;

        match (self.active_mut(), value) {
            (ActiveMut::Nullable(col), value) => col.push(value),
            (ActiveMut::Plain(col), Some(value)) => col.push(value),
            (ActiveMut::Plain(_), None) => return Err(AppendError::NodeIsNil),
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.plain.reset();
        self.nulls.reset();
    }

    fn rows(&self) -> usize {
        self.active().rows()
    }

    fn column_type(&self) -> ColumnType {
        self.active().column_type()
    }

    fn encode_column(&self, buf: &mut BytesMut) {
        self.active().encode_column(buf);
    }
}

// =============================================================================
// Enum adapter
// =============================================================================

/// Enum column adapter; enums never hold nulls
#[derive(Debug, Clone)]
pub struct EnumSlot {
    col: ColEnum,
}

impl EnumSlot {
    pub fn new(dict: Arc<EnumDictionary>) -> Self {
        Self {
            col: ColEnum::new(dict),
        }
    }

    pub fn dictionary(&self) -> &Arc<EnumDictionary> {
        self.col.dictionary()
    }

    pub fn is_nullable(&self) -> bool {
        false
    }

    pub(crate) fn truncate(&mut self, rows: usize) {
        self.col.truncate(rows);
    }
}

impl ColumnAdapter for EnumSlot {
    fn set_nullable(&mut self, enable: bool) {
        if enable {
            tracing::debug!(
                column_type = %self.col.column_type(),
                "enum columns are never nullable, ignoring"
            );
        }
    }

    fn append<N: InputNode + ?Sized>(&mut self, node: Option<&N>) -> Result<(), AppendError> {
        let node = node.ok_or(AppendError::NodeIsNil)?;
        let name = node.as_str()?;
        let code = self
            .col
            .dictionary()
            .code(name)
            .ok_or_else(|| NodeError::new(NodeShape::EnumValue, name))?;
        self.col.push(code);
        Ok(())
    }

    fn reset(&mut self) {
        self.col.reset();
    }

    fn rows(&self) -> usize {
        self.col.rows()
    }

    fn column_type(&self) -> ColumnType {
        self.col.column_type()
    }

    fn encode_column(&self, buf: &mut BytesMut) {
        self.col.encode_column(buf);
    }
}

// =============================================================================
// Column
// =============================================================================

/// Column adapter for any supported element kind
#[derive(Debug, Clone)]
pub enum Column {
    Int8(Slot<i8>),
    Int16(Slot<i16>),
    Int32(Slot<i32>),
    Int64(Slot<i64>),
    Int128(Slot<i128>),
    Int256(Slot<Int256>),
    UInt8(Slot<u8>),
    UInt16(Slot<u16>),
    UInt32(Slot<u32>),
    UInt64(Slot<u64>),
    UInt128(Slot<u128>),
    UInt256(Slot<UInt256>),
    Float32(Slot<f32>),
    Float64(Slot<f64>),
    Str(Slot<String>),
    Enum(EnumSlot),
}

macro_rules! dispatch {
    ($self:expr, $col:ident => $body:expr) => {
        match $self {
            Column::Int8($col) => $body,
            Column::Int16($col) => $body,
            Column::Int32($col) => $body,
            Column::Int64($col) => $body,
            Column::Int128($col) => $body,
            Column::Int256($col) => $body,
            Column::UInt8($col) => $body,
            Column::UInt16($col) => $body,
            Column::UInt32($col) => $body,
            Column::UInt64($col) => $body,
            Column::UInt128($col) => $body,
            Column::UInt256($col) => $body,
            Column::Float32($col) => $body,
            Column::Float64($col) => $body,
            Column::Str($col) => $body,
            Column::Enum($col) => $body,
        }
    };
}

impl Column {
    /// Create an empty, not yet configured column
    pub fn new(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Int8 => Self::Int8(Slot::default()),
            ElementKind::Int16 => Self::Int16(Slot::default()),
            ElementKind::Int32 => Self::Int32(Slot::default()),
            ElementKind::Int64 => Self::Int64(Slot::default()),
            ElementKind::Int128 => Self::Int128(Slot::default()),
            ElementKind::Int256 => Self::Int256(Slot::default()),
            ElementKind::UInt8 => Self::UInt8(Slot::default()),
            ElementKind::UInt16 => Self::UInt16(Slot::default()),
            ElementKind::UInt32 => Self::UInt32(Slot::default()),
            ElementKind::UInt64 => Self::UInt64(Slot::default()),
            ElementKind::UInt128 => Self::UInt128(Slot::default()),
            ElementKind::UInt256 => Self::UInt256(Slot::default()),
            ElementKind::Float32 => Self::Float32(Slot::default()),
            ElementKind::Float64 => Self::Float64(Slot::default()),
            ElementKind::String => Self::Str(Slot::default()),
            ElementKind::Enum(dict) => Self::Enum(EnumSlot::new(dict)),
        }
    }

    /// Create a column with its nullability already chosen
    pub fn with_nullable(kind: ElementKind, nullable: bool) -> Self {
        let mut col = Self::new(kind);
        col.set_nullable(nullable);
        col
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Int8(_) => ElementKind::Int8,
            Self::Int16(_) => ElementKind::Int16,
            Self::Int32(_) => ElementKind::Int32,
            Self::Int64(_) => ElementKind::Int64,
            Self::Int128(_) => ElementKind::Int128,
            Self::Int256(_) => ElementKind::Int256,
            Self::UInt8(_) => ElementKind::UInt8,
            Self::UInt16(_) => ElementKind::UInt16,
            Self::UInt32(_) => ElementKind::UInt32,
            Self::UInt64(_) => ElementKind::UInt64,
            Self::UInt128(_) => ElementKind::UInt128,
            Self::UInt256(_) => ElementKind::UInt256,
            Self::Float32(_) => ElementKind::Float32,
            Self::Float64(_) => ElementKind::Float64,
            Self::Str(_) => ElementKind::String,
            Self::Enum(e) => ElementKind::Enum(Arc::clone(e.dictionary())),
        }
    }

    pub fn is_nullable(&self) -> bool {
        dispatch!(self, c => c.is_nullable())
    }

    /// Drop rows from index `rows` on, undoing a partially appended record
    pub(crate) fn truncate(&mut self, rows: usize) {
        dispatch!(self, c => c.truncate(rows))
    }
}

impl ColumnAdapter for Column {
    fn set_nullable(&mut self, enable: bool) {
        dispatch!(self, c => c.set_nullable(enable))
    }

    #[inline]
    fn append<N: InputNode + ?Sized>(&mut self, node: Option<&N>) -> Result<(), AppendError> {
        dispatch!(self, c => c.append(node))
    }

    fn reset(&mut self) {
        dispatch!(self, c => c.reset())
    }

    fn rows(&self) -> usize {
        dispatch!(self, c => c.rows())
    }

    fn column_type(&self) -> ColumnType {
        dispatch!(self, c => c.column_type())
    }

    fn encode_column(&self, buf: &mut BytesMut) {
        dispatch!(self, c => c.encode_column(buf))
    }
}

#[cfg(test)]
#[path = "column_test.rs"]
mod column_test;
