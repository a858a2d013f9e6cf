//! Input value contract
//!
//! Columns never look at parsed documents directly. They see one field at a
//! time through [`InputNode`], whose accessors either return the value in the
//! requested shape or a [`NodeError`] naming the shape that was expected.
//! Presence is decided earlier, by [`Record::field`].

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

/// Longest rendering of an offending value kept in a [`NodeError`]
const MAX_ACTUAL_LEN: usize = 64;

/// Shape a column asked an input value for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    String,
    Int,
    /// A string that names a value of the column's enum dictionary
    EnumValue,
}

impl fmt::Display for NodeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Int => "int",
            Self::EnumValue => "enum value",
        })
    }
}

/// A present value that is not in the requested shape
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("expected {expected}, got {actual}")]
pub struct NodeError {
    pub expected: NodeShape,
    pub actual: String,
}

impl NodeError {
    pub fn new(expected: NodeShape, actual: impl fmt::Display) -> Self {
        let mut actual = actual.to_string();
        if actual.len() > MAX_ACTUAL_LEN {
            let mut cut = MAX_ACTUAL_LEN;
            while !actual.is_char_boundary(cut) {
                cut -= 1;
            }
            actual.truncate(cut);
            actual.push_str("...");
        }
        Self { expected, actual }
    }
}

/// One field of one input record
pub trait InputNode {
    fn as_str(&self) -> Result<&str, NodeError>;

    fn as_int(&self) -> Result<i64, NodeError>;
}

/// A record whose fields can be looked up by column name
pub trait Record {
    type Node: InputNode + ?Sized;

    /// `None` when the record has no value for `name`
    fn field(&self, name: &str) -> Option<&Self::Node>;
}

impl InputNode for Value {
    fn as_str(&self) -> Result<&str, NodeError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(NodeError::new(NodeShape::String, other)),
        }
    }

    fn as_int(&self) -> Result<i64, NodeError> {
        match self {
            Value::Number(n) => n.as_i64().ok_or_else(|| NodeError::new(NodeShape::Int, n)),
            other => Err(NodeError::new(NodeShape::Int, other)),
        }
    }
}

impl Record for Map<String, Value> {
    type Node = Value;

    #[inline]
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name).filter(|v| !v.is_null())
    }
}

impl Record for Value {
    type Node = Value;

    /// Top-level lookup; JSON `null` counts as absent
    #[inline]
    fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.field(name),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
