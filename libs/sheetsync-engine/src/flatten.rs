use std::collections::HashMap;

use sheetsync_api::{ID_FIELD, Record, Value};

/// Path separator between nesting levels.
pub const PATH_SEPARATOR: char = '.';

/// Flat view of one record: dotted path → leaf value, in first-seen order.
///
/// Leaves are never maps. Arrays stay whole. The identifier is already in its
/// canonical string form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRow {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl FlatRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a leaf. A repeated key (only possible when a field name itself
    /// contains the separator) keeps its first position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flatten `value` under `prefix` (empty prefix = document root).
pub fn flatten(value: &Value, prefix: &str) -> FlatRow {
    let mut out = FlatRow::new();
    flatten_into(value, prefix, &mut out);
    out
}

/// Flatten a whole record; top-level field names become root paths.
///
/// The identifier comes first, under `id_column`, and overrides any document
/// field that flattens to the same path.
pub fn flatten_record(record: &Record, id_column: &str) -> FlatRow {
    let id = Value::String(record.id.to_hex());
    let mut out = FlatRow::new();
    out.insert(id_column, id.clone());
    for (key, value) in &record.fields {
        if key != ID_FIELD {
            flatten_into(value, key, &mut out);
        }
    }
    out.insert(id_column, id);
    out
}

fn flatten_into(value: &Value, path: &str, out: &mut FlatRow) {
    match value {
        Value::Map(entries) => {
            for (key, child) in entries {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}{PATH_SEPARATOR}{key}")
                };
                flatten_into(child, &child_path, out);
            }
        }
        Value::Id(id) => out.insert(path, Value::String(id.to_hex())),
        leaf => out.insert(path, leaf.clone()),
    }
}

#[cfg(test)]
mod tests {
    use sheetsync_api::RecordId;

    use super::*;

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    fn count_scalar_leaves(value: &Value) -> usize {
        match value {
            Value::Map(entries) => entries.iter().map(|(_, v)| count_scalar_leaves(v)).sum(),
            _ => 1,
        }
    }

    #[test]
    fn nested_paths_are_dotted() {
        let doc = Value::Map(vec![
            ("name".into(), s("ada")),
            (
                "address".into(),
                Value::Map(vec![
                    ("city".into(), s("London")),
                    ("geo".into(), Value::Map(vec![("lat".into(), Value::Float(51.5))])),
                ]),
            ),
        ]);

        let row = flatten(&doc, "");
        let keys: Vec<&str> = row.keys().collect();
        assert_eq!(keys, vec!["name", "address.city", "address.geo.lat"]);
        assert_eq!(row.get("address.geo.lat"), Some(&Value::Float(51.5)));
    }

    #[test]
    fn null_and_arrays_are_leaves() {
        let doc = Value::Map(vec![
            ("gone".into(), Value::Null),
            ("tags".into(), Value::Array(vec![s("a"), Value::Map(vec![("x".into(), Value::Int(1))])])),
        ]);

        let row = flatten(&doc, "");
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("gone"), Some(&Value::Null));
        assert!(matches!(row.get("tags"), Some(Value::Array(items)) if items.len() == 2));
    }

    #[test]
    fn prefix_is_applied() {
        let doc = Value::Map(vec![("a".into(), Value::Int(1))]);
        let row = flatten(&doc, "meta");
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["meta.a"]);
    }

    #[test]
    fn empty_map_contributes_nothing() {
        let doc = Value::Map(vec![("a".into(), Value::Map(vec![])), ("b".into(), Value::Bool(false))]);
        let row = flatten(&doc, "");
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn identifier_becomes_hex_string() {
        let id = RecordId::new(1_700_000_000, 42);
        let record = Record::with_fields(id, vec![("n".into(), Value::Int(7))]);

        let row = flatten_record(&record, ID_FIELD);
        assert_eq!(row.get("_id"), Some(&Value::String(id.to_hex())));
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["_id", "n"]);
    }

    #[test]
    fn identifier_goes_under_configured_column() {
        let id = RecordId::new(1_700_000_000, 7);
        let record = Record::with_fields(
            id,
            vec![("n".into(), Value::Int(1)), ("id".into(), s("shadowed"))],
        );

        let row = flatten_record(&record, "id");
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["id", "n"]);
        assert_eq!(row.get("id"), Some(&Value::String(id.to_hex())));
        assert_eq!(row.get("_id"), None);
    }

    #[test]
    fn leaf_count_matches_scalar_count() {
        let doc = Value::Map(vec![
            ("a".into(), Value::Int(1)),
            ("b".into(), Value::Null),
            (
                "c".into(),
                Value::Map(vec![
                    ("d".into(), Value::Bool(true)),
                    ("e".into(), Value::Map(vec![("f".into(), s("x")), ("g".into(), Value::Null)])),
                ]),
            ),
            ("h".into(), Value::Timestamp(0)),
        ]);

        assert_eq!(flatten(&doc, "").len(), count_scalar_leaves(&doc));
        assert_eq!(flatten(&doc, "").len(), 6);
    }

    #[test]
    fn separator_in_field_name_keeps_first_position() {
        // Documented limitation: "a.b" and {a: {b}} share a path.
        let doc = Value::Map(vec![
            ("a.b".into(), Value::Int(1)),
            ("a".into(), Value::Map(vec![("b".into(), Value::Int(2))])),
        ]);
        let row = flatten(&doc, "");
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("a.b"), Some(&Value::Int(2)));
    }
}
