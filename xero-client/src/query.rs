//! Filter query generation
//!
//! Turns keyword-style constraints into the provider's boolean filter
//! expression (`Name.Contains("John")&&IsSupplier==true`), percent-encoded
//! into a single `where=` query parameter. The reserved keys `page` and
//! `since` never reach the expression: `page` routes to the pagination query
//! parameter and `since` to the `If-Modified-Since` header. Constraint sets
//! are request-scoped — built, rendered, discarded.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use uuid::Uuid;

/// A literal value usable in a filter constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Guid(Uuid),
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Str(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Str(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        FilterValue::Int(i)
    }
}

impl From<u32> for FilterValue {
    fn from(i: u32) -> Self {
        FilterValue::Int(i64::from(i))
    }
}

impl From<Decimal> for FilterValue {
    fn from(d: Decimal) -> Self {
        FilterValue::Decimal(d)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(d: NaiveDate) -> Self {
        FilterValue::Date(d)
    }
}

impl From<NaiveDateTime> for FilterValue {
    fn from(dt: NaiveDateTime) -> Self {
        FilterValue::DateTime(dt)
    }
}

impl From<Uuid> for FilterValue {
    fn from(g: Uuid) -> Self {
        FilterValue::Guid(g)
    }
}

/// An ordered set of filter constraints.
///
/// Keys are field paths with underscores standing in for dots
/// (`Contact_Name` → `Contact.Name`), optionally carrying a
/// double-underscore operator suffix (`Name__Contains`). Term order in the
/// rendered expression follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    params: IndexMap<String, FilterValue>,
}

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint, builder-style.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a constraint in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// The rendered pieces of a filter request.
#[derive(Debug, Default)]
pub(crate) struct BuiltQuery {
    /// Percent-encoded filter expression, ready for a `where=` parameter.
    pub where_clause: Option<String>,
    /// Extracted `page` constraint.
    pub page: Option<u32>,
    /// Headers produced by the reserved `since` constraint.
    pub headers: Vec<(String, String)>,
}

pub(crate) fn build_query(mut params: FilterParams) -> BuiltQuery {
    let mut built = BuiltQuery::default();

    if let Some(FilterValue::Int(n)) = params.params.shift_remove("page") {
        if n > 0 {
            built.page = Some(n as u32);
        }
    }

    if let Some(since) = params.params.shift_remove("since") {
        let value = match since {
            FilterValue::DateTime(dt) => dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
            FilterValue::Date(d) => format!("\"{d}\""),
            FilterValue::Str(s) => format!("\"{s}\""),
            other => format!("\"{}\"", render_plain(&other)),
        };
        built.headers.push(("If-Modified-Since".to_string(), value));
    }

    let terms: Vec<String> = params
        .params
        .iter()
        .map(|(key, value)| render_term(key, value))
        .collect();
    if !terms.is_empty() {
        built.where_clause = Some(urlencoding::encode(&terms.join("&&")).into_owned());
    }
    built
}

/// Split a trailing `__operator` suffix off a constraint key. The suffix is
/// matched case-insensitively; unknown suffixes are left on the field path.
fn split_operator(key: &str) -> (&str, Option<&'static str>) {
    if let Some((field, suffix)) = key.rsplit_once("__") {
        let op = match suffix.to_ascii_lowercase().as_str() {
            "contains" => Some("Contains"),
            "startswith" => Some("StartsWith"),
            "endswith" => Some("EndsWith"),
            _ => None,
        };
        if op.is_some() {
            return (field, op);
        }
    }
    (key, None)
}

fn render_term(key: &str, value: &FilterValue) -> String {
    let (field, op) = split_operator(key);
    let literal = render_literal(field, value);
    let path = field.replace('_', ".");
    match op {
        Some(op) => format!("{path}.{op}({literal})"),
        None => format!("{path}=={literal}"),
    }
}

fn render_literal(field: &str, value: &FilterValue) -> String {
    match value {
        FilterValue::Bool(true) => "true".to_string(),
        FilterValue::Bool(false) => "false".to_string(),
        FilterValue::DateTime(dt) => dt.format("DateTime(%Y, %m, %d, %H, %M, %S)").to_string(),
        FilterValue::Date(d) => d.format("DateTime(%Y, %m, %d)").to_string(),
        FilterValue::Guid(g) => format!("Guid(\"{g}\")"),
        other if field.ends_with("ID") => format!("Guid(\"{}\")", render_plain(other)),
        FilterValue::Str(s) => format!("\"{s}\""),
        FilterValue::Int(i) => format!("\"{i}\""),
        FilterValue::Decimal(d) => format!("\"{d}\""),
    }
}

fn render_plain(value: &FilterValue) -> String {
    match value {
        FilterValue::Str(s) => s.clone(),
        FilterValue::Bool(b) => b.to_string(),
        FilterValue::Int(i) => i.to_string(),
        FilterValue::Decimal(d) => d.to_string(),
        FilterValue::Date(d) => d.to_string(),
        FilterValue::DateTime(dt) => dt.to_string(),
        FilterValue::Guid(g) => g.to_string(),
    }
}
