//! Column errors

use thiserror::Error;

use crate::node::NodeError;

/// Failure to append one value to one column
///
/// Reported before any buffer is touched, so the column's row count is the
/// same after a failed append as before it.
#[derive(Debug, Error, PartialEq)]
pub enum AppendError {
    /// An absent value reached a column that is not nullable
    #[error("node is nil, but column is not")]
    NodeIsNil,

    /// A present value could not be read in the shape the column needs
    #[error(transparent)]
    TypeCoercion(#[from] NodeError),
}

impl AppendError {
    /// Whether this is a missing required value rather than a malformed one
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::NodeIsNil)
    }
}

/// A record rejected by a column set
#[derive(Debug, Error, PartialEq)]
#[error("column '{column}': {source}")]
pub struct RecordError {
    /// Name of the first column that refused its value
    pub column: String,
    #[source]
    pub source: AppendError,
}

/// Invalid column type definition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unsupported column type '{0}'")]
    UnsupportedType(String),

    #[error("enum columns cannot be nullable: '{0}'")]
    NullableEnum(String),

    #[error("nested Nullable is not allowed: '{0}'")]
    NestedNullable(String),

    #[error("enum definition has no values")]
    EmptyEnum,

    #[error("malformed enum entry '{0}'")]
    MalformedEnumEntry(String),

    #[error("duplicate enum value '{0}'")]
    DuplicateEnumName(String),

    #[error("{width} value '{name}' has out-of-range code {code}")]
    EnumCodeOutOfRange {
        width: &'static str,
        name: String,
        code: i64,
    },
}
