//! Leaf type coercion
//!
//! A leaf that held literal text is coerced to the scalar type its field
//! name implies. Only leaves go through this path; structural values are
//! never coerced. Malformed decimal, GUID or integer text is a hard decode
//! failure — it must never degrade silently to a default or a string.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::dates::{self, ParsedDate};
use crate::error::Error;
use crate::tables::MarshalTables;
use crate::value::Value;

/// Target scalar type implied by a field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionRule {
    Decimal,
    Boolean,
    DateTime,
    Date,
    Guid,
    Integer,
    None,
}

/// Coerce leaf text according to the rule for `field`.
pub fn coerce_leaf(tables: &MarshalTables, field: &str, text: &str) -> Result<Value, Error> {
    let failure = || Error::DecodeFailure {
        field: field.to_string(),
        value: text.to_string(),
    };

    match tables.resolve(field) {
        CoercionRule::Decimal => text
            .parse::<Decimal>()
            .map(Value::Decimal)
            .map_err(|_| failure()),
        CoercionRule::Boolean => Ok(Value::Bool(text.eq_ignore_ascii_case("true"))),
        CoercionRule::DateTime => Ok(match dates::parse_wire_date(text, true) {
            Some(parsed) => Value::DateTime(parsed.as_datetime()),
            // Not a recognized date literal; keep the text.
            None => Value::String(text.to_string()),
        }),
        CoercionRule::Date => Ok(match dates::parse_wire_date(text, false) {
            Some(ParsedDate::Date(d)) => Value::Date(d),
            Some(ParsedDate::DateTime(dt)) => Value::DateTime(dt),
            None => Value::String(text.to_string()),
        }),
        CoercionRule::Guid => Uuid::parse_str(text).map(Value::Guid).map_err(|_| failure()),
        CoercionRule::Integer => text.parse::<i64>().map(Value::Int).map_err(|_| failure()),
        CoercionRule::None => Ok(Value::String(text.to_string())),
    }
}
