//! Column definitions and ClickHouse type parsing
//!
//! Turns type strings such as `Nullable(UInt16)` or
//! `Enum8('debug' = 1, 'info' = 2)` into a [`ColumnSpec`].

use std::str::FromStr;
use std::sync::Arc;

use crate::column::ElementKind;
use crate::error::SchemaError;
use crate::proto::{ColumnType, EnumDictionary, EnumWidth};

/// Definition of one destination column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ElementKind,
    pub nullable: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ElementKind, nullable: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable,
        }
    }

    /// Parse a column from its name and ClickHouse type
    pub fn parse(name: impl Into<String>, type_name: &str) -> Result<Self, SchemaError> {
        let type_name = type_name.trim();

        let (kind, nullable) = match unwrap_call(type_name, "Nullable") {
            Some(inner) => {
                if unwrap_call(inner, "Nullable").is_some() {
                    return Err(SchemaError::NestedNullable(type_name.to_string()));
                }
                let kind: ElementKind = inner.parse()?;
                if !kind.supports_null() {
                    return Err(SchemaError::NullableEnum(type_name.to_string()));
                }
                (kind, true)
            }
            None => (type_name.parse()?, false),
        };

        Ok(Self::new(name, kind, nullable))
    }

    /// Wire type tag this column will carry
    pub fn column_type(&self) -> ColumnType {
        let base = self.kind.column_type();
        if self.nullable { base.nullable() } else { base }
    }
}

impl FromStr for ElementKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let kind = match s {
            "Int8" => Self::Int8,
            "Int16" => Self::Int16,
            "Int32" => Self::Int32,
            "Int64" => Self::Int64,
            "Int128" => Self::Int128,
            "Int256" => Self::Int256,
            "UInt8" => Self::UInt8,
            "UInt16" => Self::UInt16,
            "UInt32" => Self::UInt32,
            "UInt64" => Self::UInt64,
            "UInt128" => Self::UInt128,
            "UInt256" => Self::UInt256,
            "Float32" => Self::Float32,
            "Float64" => Self::Float64,
            "String" => Self::String,
            _ => {
                if let Some(body) = unwrap_call(s, "Enum8") {
                    Self::Enum(Arc::new(parse_enum(EnumWidth::Enum8, body)?))
                } else if let Some(body) = unwrap_call(s, "Enum16") {
                    Self::Enum(Arc::new(parse_enum(EnumWidth::Enum16, body)?))
                } else {
                    return Err(SchemaError::UnsupportedType(s.to_string()));
                }
            }
        };
        Ok(kind)
    }
}

/// `Name(inner)` → `inner`
fn unwrap_call<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
        .map(str::trim)
}

/// Parse `'a' = 1, 'b' = 2`
fn parse_enum(width: EnumWidth, body: &str) -> Result<EnumDictionary, SchemaError> {
    let mut entries = Vec::new();
    let mut rest = body.trim();

    while !rest.is_empty() {
        let malformed = || SchemaError::MalformedEnumEntry(rest.to_string());

        let (name, after_name) = parse_quoted(rest).ok_or_else(malformed)?;
        let after_eq = after_name
            .trim_start()
            .strip_prefix('=')
            .ok_or_else(malformed)?
            .trim_start();

        let num_len = after_eq
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
            .map_or(after_eq.len(), |(i, _)| i);
        let code: i64 = after_eq[..num_len].parse().map_err(|_| malformed())?;

        entries.push((name, code));

        let tail = after_eq[num_len..].trim_start();
        rest = match tail.strip_prefix(',') {
            Some(next) => {
                let next = next.trim_start();
                if next.is_empty() {
                    return Err(malformed());
                }
                next
            }
            None if tail.is_empty() => tail,
            None => return Err(malformed()),
        };
    }

    EnumDictionary::new(width, entries)
}

/// Parse a single-quoted string with `\` escapes, returning it and the rest
fn parse_quoted(s: &str) -> Option<(String, &str)> {
    let mut chars = s.strip_prefix('\'')?.char_indices();
    let mut out = String::new();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => out.push(chars.next()?.1),
            '\'' => return Some((out, &s[i + 2..])),
            c => out.push(c),
        }
    }
    None
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod schema_test;
