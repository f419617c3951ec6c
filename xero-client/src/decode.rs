//! Tree walker/decoder
//!
//! Converts a parsed wire document into nested [`Value`]s. The wire carries
//! no schema, so shape is inferred from naming alone: repeated sibling tags
//! become lists, a plural-named wrapper around a single singular-named child
//! collapses into a one-element list (so collections type uniformly whether
//! they hold 0, 1 or N entries), and leaf text goes through the field-name
//! coercion table. The JSON decoder applies the exact same rules to JSON's
//! native mapping/list shapes — one heuristic, two wire syntaxes.

use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::coerce::{self, CoercionRule};
use crate::error::Error;
use crate::pluralization::is_plural;
use crate::tables::MarshalTables;
use crate::value::{Record, Value};

/// Decodes wire documents against a fixed set of marshalling tables.
pub struct Decoder<'a> {
    tables: &'a MarshalTables,
}

impl<'a> Decoder<'a> {
    pub fn new(tables: &'a MarshalTables) -> Self {
        Self { tables }
    }

    /// Decode an XML document, returning the value of its root element.
    pub fn decode_document(&self, xml: &str) -> Result<Value, Error> {
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| Error::MalformedDocument(e.to_string()))?;
        self.decode_element(doc.root_element())
    }

    /// Decode a JSON document with the same collection and coercion rules
    /// as the XML tree walk.
    pub fn decode_json(&self, json: &serde_json::Value) -> Result<Value, Error> {
        self.decode_json_value("", json)
    }

    fn decode_element(&self, node: roxmltree::Node<'_, '_>) -> Result<Value, Error> {
        let tag = node.tag_name().name();
        let children: Vec<roxmltree::Node<'_, '_>> =
            node.children().filter(|n| n.is_element()).collect();

        if children.is_empty() {
            let text = element_text(&node);
            if text.is_empty() {
                // An empty plural-named element is an empty collection;
                // anything else is an empty text field.
                if is_plural(tag) && self.tables.singularize(tag) != tag {
                    return Ok(Value::List(Vec::new()));
                }
                return Ok(Value::String(String::new()));
            }
            return coerce::coerce_leaf(self.tables, tag, &text);
        }

        // More than one child, all sharing one tag: a direct list of
        // structurally-identical entries.
        let first = children[0].tag_name().name();
        if children.len() > 1 && children.iter().all(|c| c.tag_name().name() == first) {
            let entries = children
                .iter()
                .map(|c| self.decode_element(*c))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Value::List(entries));
        }

        // Mixed tags: group by tag, preserving first-occurrence order. A tag
        // shared by several siblings decodes to the list of them.
        let mut groups: IndexMap<&str, Vec<roxmltree::Node<'_, '_>>> = IndexMap::new();
        for child in &children {
            groups.entry(child.tag_name().name()).or_default().push(*child);
        }

        let mut record = Record::new();
        for (key, group) in groups {
            let value = if group.len() > 1 {
                Value::List(
                    group
                        .iter()
                        .map(|c| self.decode_element(*c))
                        .collect::<Result<Vec<_>, _>>()?,
                )
            } else {
                self.decode_element(group[0])?
            };
            record.insert(key.to_string(), self.finish_field(key, value));
        }
        Ok(Value::Record(record))
    }

    /// Post-process a decoded child value under key `key`: plural-collapse,
    /// then force known collection fields into list shape.
    fn finish_field(&self, key: &str, value: Value) -> Value {
        let value = self.plural_collapse(key, value);
        if self.tables.is_collection(key) && !matches!(value, Value::List(_)) {
            return match value {
                Value::String(s) if s.is_empty() => Value::List(Vec::new()),
                Value::Null => Value::List(Vec::new()),
                other => Value::List(vec![other]),
            };
        }
        value
    }

    /// The plural-collapse rule: a record under a plural key K whose only
    /// field is `singular(K)` is really a one-element collection that the
    /// wire could not distinguish from a nested record.
    fn plural_collapse(&self, key: &str, value: Value) -> Value {
        if !is_plural(key) {
            return value;
        }
        let singular = self.tables.singularize(key);
        if singular == key {
            return value;
        }
        match value {
            Value::Record(mut rec) if rec.len() == 1 && rec.contains_key(&singular) => {
                let inner = rec.shift_remove(&singular).expect("sole key is present");
                Value::List(vec![inner])
            }
            other => other,
        }
    }

    fn decode_json_value(&self, field: &str, json: &serde_json::Value) -> Result<Value, Error> {
        use serde_json::Value as Json;
        match json {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) => self.decode_json_number(field, n),
            Json::String(s) => coerce::coerce_leaf(self.tables, field, s),
            Json::Array(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| self.decode_json_value(field, item))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Json::Object(map) => {
                let mut record = Record::new();
                for (key, value) in map {
                    let decoded = self.decode_json_value(key, value)?;
                    record.insert(key.clone(), self.finish_field(key, decoded));
                }
                Ok(Value::Record(record))
            }
        }
    }

    fn decode_json_number(&self, field: &str, n: &serde_json::Number) -> Result<Value, Error> {
        let failure = || Error::DecodeFailure {
            field: field.to_string(),
            value: n.to_string(),
        };
        match self.tables.resolve(field) {
            CoercionRule::Decimal => n
                .to_string()
                .parse::<Decimal>()
                .map(Value::Decimal)
                .map_err(|_| failure()),
            CoercionRule::Integer => n.as_i64().map(Value::Int).ok_or_else(failure),
            _ => match n.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => n
                    .to_string()
                    .parse::<Decimal>()
                    .map(Value::Decimal)
                    .map_err(|_| failure()),
            },
        }
    }
}

fn element_text(node: &roxmltree::Node<'_, '_>) -> String {
    let mut out = String::new();
    for child in node.children() {
        if child.is_text() {
            if let Some(t) = child.text() {
                out.push_str(t.trim());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn decode(xml: &str) -> Value {
        let tables = MarshalTables::default();
        Decoder::new(&tables).decode_document(xml).unwrap()
    }

    #[test]
    fn test_leaf_coercion_applies_to_text_nodes() {
        let value = decode(
            "<Invoice>\
               <InvoiceNumber>INV-100</InvoiceNumber>\
               <Total>150.00</Total>\
               <DueDate>2013-05-10T00:00:00</DueDate>\
               <SentToContact>true</SentToContact>\
             </Invoice>",
        );
        let rec = value.as_record().unwrap();
        assert_eq!(rec["InvoiceNumber"], Value::String("INV-100".into()));
        assert_eq!(rec["Total"], Value::Decimal("150.00".parse().unwrap()));
        assert_eq!(
            rec["DueDate"],
            Value::Date(NaiveDate::from_ymd_opt(2013, 5, 10).unwrap())
        );
        assert_eq!(rec["SentToContact"], Value::Bool(true));
    }

    #[test]
    fn test_repeated_identical_tags_decode_to_a_list() {
        let value = decode(
            "<Contacts>\
               <Contact><Name>Alpha</Name></Contact>\
               <Contact><Name>Beta</Name></Contact>\
             </Contacts>",
        );
        let list = value.as_list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].as_record().unwrap()["Name"], Value::String("Alpha".into()));
        assert_eq!(list[1].as_record().unwrap()["Name"], Value::String("Beta".into()));
    }

    #[test]
    fn test_repeated_tags_inside_a_mixed_record() {
        let value = decode(
            "<Contact>\
               <Name>Alpha</Name>\
               <Note>first</Note>\
               <Note>second</Note>\
             </Contact>",
        );
        let rec = value.as_record().unwrap();
        assert_eq!(
            rec["Note"],
            Value::List(vec![Value::String("first".into()), Value::String("second".into())])
        );
    }

    #[test]
    fn test_plural_collapse_promotes_a_singleton() {
        let value = decode(
            "<Contact>\
               <Name>Alpha</Name>\
               <Addresses>\
                 <Address><City>Wellington</City></Address>\
               </Addresses>\
             </Contact>",
        );
        let rec = value.as_record().unwrap();
        let addresses = rec["Addresses"].as_list().expect("a single address must still be a list");
        assert_eq!(addresses.len(), 1);
        assert_eq!(
            addresses[0].as_record().unwrap()["City"],
            Value::String("Wellington".into())
        );
    }

    #[test]
    fn test_collection_shape_is_uniform_for_zero_one_and_many() {
        let empty = decode("<Contact><Name>A</Name><Addresses/></Contact>");
        let one = decode(
            "<Contact><Name>A</Name>\
             <Addresses><Address><City>X</City></Address></Addresses></Contact>",
        );
        let many = decode(
            "<Contact><Name>A</Name>\
             <Addresses>\
               <Address><City>X</City></Address>\
               <Address><City>Y</City></Address>\
             </Addresses></Contact>",
        );
        for (value, len) in [(&empty, 0), (&one, 1), (&many, 2)] {
            let rec = value.as_record().unwrap();
            assert_eq!(rec["Addresses"].as_list().unwrap().len(), len);
        }
    }

    #[test]
    fn test_irregular_plural_uses_the_exception_table() {
        // "Addresses" strips to "Addresse"; the exception table maps the
        // stem to "Address", which must match the child tag for collapse.
        let value = decode(
            "<Contact><Addresses><Address><City>X</City></Address></Addresses></Contact>",
        );
        assert!(value.as_record().unwrap()["Addresses"].as_list().is_some());
    }

    #[test]
    fn test_whitespace_only_text_is_dropped() {
        let value = decode(
            "<Contact>\n  <Name>Alpha</Name>\n  <Addresses>\n    <Address>\n      <City>X</City>\n    </Address>\n  </Addresses>\n</Contact>",
        );
        let rec = value.as_record().unwrap();
        assert_eq!(rec["Name"], Value::String("Alpha".into()));
        assert_eq!(rec["Addresses"].as_list().unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_leaf_propagates_a_decode_failure() {
        let tables = MarshalTables::default();
        let err = Decoder::new(&tables)
            .decode_document("<Invoice><Total>lots</Total></Invoice>")
            .unwrap_err();
        assert!(matches!(err, Error::DecodeFailure { .. }));
    }

    #[test]
    fn test_field_order_is_preserved() {
        let value = decode("<C><Z>1</Z><A>2</A><M>3</M></C>");
        let keys: Vec<&str> = value.as_record().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_json_decoding_shares_the_heuristics() {
        let tables = MarshalTables::default();
        let decoder = Decoder::new(&tables);
        let value = decoder
            .decode_json(&json!({
                "Name": "Alpha",
                "IsSupplier": true,
                "Total": "42.50",
                "UpdatedDateUTC": "/Date(1376543055997)/",
                "Addresses": {"Address": {"City": "Wellington"}}
            }))
            .unwrap();
        let rec = value.as_record().unwrap();
        assert_eq!(rec["IsSupplier"], Value::Bool(true));
        assert_eq!(rec["Total"], Value::Decimal("42.50".parse().unwrap()));
        assert!(matches!(rec["UpdatedDateUTC"], Value::DateTime(_)));
        // Plural-collapse applies to the JSON shape too.
        assert_eq!(rec["Addresses"].as_list().unwrap().len(), 1);
    }

    #[test]
    fn test_json_numbers_respect_the_coercion_table() {
        let tables = MarshalTables::default();
        let decoder = Decoder::new(&tables);
        let value = decoder
            .decode_json(&json!({"Total": 150, "FinancialYearEndDay": 31, "Weight": 2.5}))
            .unwrap();
        let rec = value.as_record().unwrap();
        assert_eq!(rec["Total"], Value::Decimal("150".parse().unwrap()));
        assert_eq!(rec["FinancialYearEndDay"], Value::Int(31));
        assert_eq!(rec["Weight"], Value::Decimal("2.5".parse().unwrap()));
    }
}
