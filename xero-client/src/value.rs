//! Native value representation for marshalled records

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ordered field-name → value mapping. Records have no declared schema;
/// every field's type is whatever decoding inferred for it.
pub type Record = IndexMap<String, Value>;

/// A value recovered from (or destined for) the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Null/empty value
    Null,
    /// Plain text
    String(String),
    /// Exact decimal (money, quantities)
    Decimal(Decimal),
    /// Boolean
    Bool(bool),
    /// Calendar date without a time of day
    Date(NaiveDate),
    /// Wall-clock instant with no timezone metadata
    DateTime(NaiveDateTime),
    /// Unique identifier
    Guid(Uuid),
    /// Whole number
    Int(i64),
    /// Nested record
    Record(Record),
    /// Ordered sequence of values
    List(Vec<Value>),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as decimal
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Try to get as GUID
    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Value::Guid(g) => Some(*g),
            _ => None,
        }
    }

    /// Try to get as a nested record
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Try to get as a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Human-readable type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::String(_) => "String",
            Value::Decimal(_) => "Decimal",
            Value::Bool(_) => "Bool",
            Value::Date(_) => "Date",
            Value::DateTime(_) => "DateTime",
            Value::Guid(_) => "Guid",
            Value::Int(_) => "Int",
            Value::Record(_) => "Record",
            Value::List(_) => "List",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "(null)"),
            Value::String(s) => write!(f, "{}", s),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::Guid(g) => write!(f, "{}", g),
            Value::Int(i) => write!(f, "{}", i),
            Value::Record(r) => write!(f, "record({} fields)", r.len()),
            Value::List(l) => write!(f, "list({} entries)", l.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<Uuid> for Value {
    fn from(g: Uuid) -> Self {
        Value::Guid(g)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}
