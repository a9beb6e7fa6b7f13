//! Bound statement parameters as handed over by the query-execution layer.

use std::fmt;
use std::io::{Read, Seek};

/// A readable, rewindable large-object stream.
pub trait LobStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> LobStream for T {}

/// Value bound to a positional `:pN` placeholder.
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    /// Streamed large object; consumed by `cleanup_sql` when it targets a LOB column.
    Stream(Box<dyn LobStream>),
}

impl ParamValue {
    pub fn stream(reader: impl LobStream + 'static) -> Self {
        ParamValue::Stream(Box::new(reader))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, ParamValue::Stream(_))
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => f.write_str("Null"),
            ParamValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            ParamValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            ParamValue::Float(v) => f.debug_tuple("Float").field(v).finish(),
            ParamValue::Text(v) => f.debug_tuple("Text").field(v).finish(),
            ParamValue::Bytes(v) => write!(f, "Bytes({} bytes)", v.len()),
            ParamValue::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A parameter together with the column it is bound to, when known.
#[derive(Debug)]
pub struct BoundParam {
    pub table: Option<String>,
    pub column: Option<String>,
    pub value: ParamValue,
}

impl BoundParam {
    /// Parameter with no column association (e.g., a WHERE literal).
    pub fn new(value: ParamValue) -> Self {
        Self {
            table: None,
            column: None,
            value,
        }
    }

    pub fn for_column(table: impl Into<String>, column: impl Into<String>, value: ParamValue) -> Self {
        Self {
            table: Some(table.into()),
            column: Some(column.into()),
            value,
        }
    }
}
