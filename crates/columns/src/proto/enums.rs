//! Enum8 / Enum16 columns

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use bytes::{BufMut, BytesMut};

use super::{ColInput, ColumnBuffer, ColumnType};
use crate::error::SchemaError;

/// Storage width of an enum column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumWidth {
    Enum8,
    Enum16,
}

impl EnumWidth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enum8 => "Enum8",
            Self::Enum16 => "Enum16",
        }
    }

    fn fits(&self, code: i64) -> bool {
        match self {
            Self::Enum8 => i8::try_from(code).is_ok(),
            Self::Enum16 => i16::try_from(code).is_ok(),
        }
    }
}

/// Fixed name → code mapping of an enum column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDictionary {
    width: EnumWidth,
    entries: Vec<(String, i16)>,
    index: HashMap<String, i16>,
}

impl EnumDictionary {
    /// Build a dictionary, rejecting empty, duplicate or out-of-range entries
    pub fn new<I, S>(width: EnumWidth, entries: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut dict = Self {
            width,
            entries: Vec::new(),
            index: HashMap::new(),
        };

        for (name, code) in entries {
            let name = name.into();
            if !width.fits(code) {
                return Err(SchemaError::EnumCodeOutOfRange {
                    width: width.as_str(),
                    name,
                    code,
                });
            }
            if dict.index.contains_key(&name) {
                return Err(SchemaError::DuplicateEnumName(name));
            }
            // `fits` guarantees the narrowing is lossless
            let code = code as i16;
            dict.index.insert(name.clone(), code);
            dict.entries.push((name, code));
        }

        if dict.entries.is_empty() {
            return Err(SchemaError::EmptyEnum);
        }

        Ok(dict)
    }

    pub fn width(&self) -> EnumWidth {
        self.width
    }

    /// Code for `name`, if the dictionary defines it
    #[inline]
    pub fn code(&self, name: &str) -> Option<i16> {
        self.index.get(name).copied()
    }

    pub fn entries(&self) -> &[(String, i16)] {
        &self.entries
    }

    /// ClickHouse type tag, e.g. `Enum8('debug' = 1, 'info' = 2)`
    pub fn column_type(&self) -> ColumnType {
        let mut s = String::with_capacity(16 + self.entries.len() * 12);
        s.push_str(self.width.as_str());
        s.push('(');
        for (i, (name, code)) in self.entries.iter().enumerate() {
            if i > 0 {
                s.push_str(", ");
            }
            s.push('\'');
            for c in name.chars() {
                if c == '\'' || c == '\\' {
                    s.push('\\');
                }
                s.push(c);
            }
            s.push('\'');
            let _ = write!(s, " = {code}");
        }
        s.push(')');
        ColumnType::new(s)
    }
}

/// Enum column storing dictionary codes
#[derive(Debug, Clone, PartialEq)]
pub struct ColEnum {
    dict: Arc<EnumDictionary>,
    codes: Vec<i16>,
}

impl ColEnum {
    pub fn new(dict: Arc<EnumDictionary>) -> Self {
        Self {
            dict,
            codes: Vec::new(),
        }
    }

    pub fn dictionary(&self) -> &Arc<EnumDictionary> {
        &self.dict
    }

    pub fn codes(&self) -> &[i16] {
        &self.codes
    }
}

impl ColInput for ColEnum {
    fn rows(&self) -> usize {
        self.codes.len()
    }

    fn column_type(&self) -> ColumnType {
        self.dict.column_type()
    }

    fn encode_column(&self, buf: &mut BytesMut) {
        match self.dict.width() {
            EnumWidth::Enum8 => {
                buf.reserve(self.codes.len());
                for &code in &self.codes {
                    buf.put_i8(code as i8);
                }
            }
            EnumWidth::Enum16 => {
                buf.reserve(self.codes.len() * 2);
                for &code in &self.codes {
                    buf.put_i16_le(code);
                }
            }
        }
    }

    fn reset(&mut self) {
        self.codes.clear();
    }
}

impl ColumnBuffer for ColEnum {
    type Item = i16;

    #[inline]
    fn push(&mut self, code: i16) {
        self.codes.push(code);
    }

    fn truncate(&mut self, rows: usize) {
        self.codes.truncate(rows);
    }
}
