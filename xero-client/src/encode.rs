//! Tree encoder
//!
//! Inverse of the decoder: serializes native records back into the
//! hierarchical wire format. The root element carries the entity name, each
//! record is wrapped in a singular-named child, and list-valued fields under
//! plural keys unroll into repeated singular-named children using the same
//! exception table as decoding. Server-computed fields in the never-send set
//! are skipped unconditionally.

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::BytesText;

use crate::error::Error;
use crate::pluralization::is_plural;
use crate::tables::MarshalTables;
use crate::value::{Record, Value};

/// Encodes records into wire documents against a fixed set of tables.
pub struct Encoder<'a> {
    tables: &'a MarshalTables,
}

impl<'a> Encoder<'a> {
    pub fn new(tables: &'a MarshalTables) -> Self {
        Self { tables }
    }

    /// Serialize one or more records as a document rooted at the entity
    /// name, each record wrapped in a singular-named element.
    pub fn encode_entity(&self, name: &str, records: &[Record]) -> Result<String, Error> {
        let singular = self.tables.singularize(name);
        let root = if singular == name {
            format!("{name}s")
        } else {
            name.to_string()
        };

        let mut writer = Writer::new(Vec::new());
        writer
            .create_element(root.as_str())
            .write_inner_content(|w| {
                for record in records {
                    w.create_element(singular.as_str())
                        .write_inner_content(|w| self.write_record(w, record))?;
                }
                Ok(())
            })
            .map_err(|e: io::Error| Error::MalformedDocument(e.to_string()))?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::MalformedDocument(e.to_string()))
    }

    fn write_record<W: Write>(&self, w: &mut Writer<W>, record: &Record) -> io::Result<()> {
        for (key, value) in record {
            if self.tables.is_never_send(key) {
                continue;
            }
            self.write_field(w, key, value)?;
        }
        Ok(())
    }

    fn write_field<W: Write>(&self, w: &mut Writer<W>, key: &str, value: &Value) -> io::Result<()> {
        match value {
            Value::Record(rec) => {
                w.create_element(key)
                    .write_inner_content(|w| self.write_record(w, rec))?;
            }
            Value::List(items) => self.write_list(w, key, items)?,
            Value::Null => {
                w.create_element(key).write_empty()?;
            }
            scalar => {
                w.create_element(key)
                    .write_text_content(BytesText::new(&scalar_text(scalar)))?;
            }
        }
        Ok(())
    }

    fn write_list<W: Write>(&self, w: &mut Writer<W>, key: &str, items: &[Value]) -> io::Result<()> {
        let singular = self.tables.singularize(key);
        if is_plural(key) && singular != key {
            // Plural key: wrap the entries in the key's element, one
            // singular-named child per entry.
            w.create_element(key).write_inner_content(|w| {
                for item in items {
                    self.write_field(w, &singular, item)?;
                }
                Ok(())
            })?;
        } else {
            // Non-plural key: repeat the key itself for every entry.
            for item in items {
                self.write_field(w, key, item)?;
            }
        }
        Ok(())
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // rust_decimal renders plain digits, locale-independent, never
        // scientific notation.
        Value::Decimal(d) => d.to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Date(d) => d.format("%Y-%m-%dT00:00:00").to_string(),
        Value::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        Value::Guid(g) => g.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Null | Value::Record(_) | Value::List(_) => {
            unreachable!("structural values are written as elements")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Decoder;
    use chrono::NaiveDate;
    use indexmap::indexmap;

    fn tables() -> MarshalTables {
        MarshalTables::default()
    }

    #[test]
    fn test_root_and_singular_wrapping() {
        let t = tables();
        let record = indexmap! {"Name".to_string() => Value::String("Alpha".into())};
        let xml = Encoder::new(&t).encode_entity("Contacts", &[record]).unwrap();
        assert_eq!(xml, "<Contacts><Contact><Name>Alpha</Name></Contact></Contacts>");
    }

    #[test]
    fn test_singular_entity_name_gets_a_plural_root() {
        let t = tables();
        let record = indexmap! {"Name".to_string() => Value::String("Org".into())};
        let xml = Encoder::new(&t).encode_entity("Organisation", &[record]).unwrap();
        assert!(xml.starts_with("<Organisations><Organisation>"));
    }

    #[test]
    fn test_never_send_fields_are_skipped() {
        let t = tables();
        let record = indexmap! {
            "Name".to_string() => Value::String("Alpha".into()),
            "UpdatedDateUTC".to_string() => Value::DateTime(
                NaiveDate::from_ymd_opt(2013, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap()
            ),
        };
        let xml = Encoder::new(&t).encode_entity("Contacts", &[record]).unwrap();
        assert!(!xml.contains("UpdatedDateUTC"));
    }

    #[test]
    fn test_plural_list_unrolls_to_singular_children() {
        let t = tables();
        let record = indexmap! {
            "Addresses".to_string() => Value::List(vec![
                Value::Record(indexmap! {"City".to_string() => Value::String("X".into())}),
                Value::Record(indexmap! {"City".to_string() => Value::String("Y".into())}),
            ]),
        };
        let xml = Encoder::new(&t).encode_entity("Contacts", &[record]).unwrap();
        assert!(xml.contains(
            "<Addresses><Address><City>X</City></Address><Address><City>Y</City></Address></Addresses>"
        ));
    }

    #[test]
    fn test_non_plural_list_repeats_the_key() {
        let t = tables();
        let record = indexmap! {
            "Note".to_string() => Value::List(vec![
                Value::String("first".into()),
                Value::String("second".into()),
            ]),
        };
        let xml = Encoder::new(&t).encode_entity("Contacts", &[record]).unwrap();
        assert!(xml.contains("<Note>first</Note><Note>second</Note>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let t = tables();
        let record = indexmap! {"Name".to_string() => Value::String("A & B <C>".into())};
        let xml = Encoder::new(&t).encode_entity("Contacts", &[record]).unwrap();
        assert!(xml.contains("A &amp; B &lt;C&gt;"));
    }

    #[test]
    fn test_encode_then_decode_round_trips() {
        let t = tables();
        let record: Record = indexmap! {
            "Name".to_string() => Value::String("Alpha Ltd".into()),
            "ContactID".to_string() => Value::Guid("565acaa9-e7f3-4fbf-80c3-16b081ddae10".parse().unwrap()),
            "IsSupplier".to_string() => Value::Bool(true),
            "Total".to_string() => Value::Decimal("150.00".parse().unwrap()),
            "DueDate".to_string() => Value::Date(NaiveDate::from_ymd_opt(2013, 5, 10).unwrap()),
            "CreatedDateUTC".to_string() => Value::DateTime(
                NaiveDate::from_ymd_opt(2013, 1, 1).unwrap().and_hms_opt(9, 30, 5).unwrap()
            ),
            "FinancialYearEndDay".to_string() => Value::Int(31),
            "Addresses".to_string() => Value::List(vec![
                Value::Record(indexmap! {"City".to_string() => Value::String("Wellington".into())}),
            ]),
            "Note".to_string() => Value::List(vec![
                Value::String("first".into()),
                Value::String("second".into()),
            ]),
        };

        let xml = Encoder::new(&t).encode_entity("Contacts", &[record.clone()]).unwrap();
        let decoded = Decoder::new(&t).decode_document(&xml).unwrap();
        let wrapper = decoded.as_record().unwrap();
        assert_eq!(wrapper["Contact"], Value::Record(record));
    }

    #[test]
    fn test_empty_list_round_trips_to_an_empty_list() {
        let t = tables();
        let record: Record = indexmap! {
            "Name".to_string() => Value::String("Alpha".into()),
            "Addresses".to_string() => Value::List(Vec::new()),
        };
        let xml = Encoder::new(&t).encode_entity("Contacts", &[record.clone()]).unwrap();
        let decoded = Decoder::new(&t).decode_document(&xml).unwrap();
        assert_eq!(decoded.as_record().unwrap()["Contact"], Value::Record(record));
    }
}
