use mongodb::bson::{Bson, Document};

use sheetsync_api::{ID_FIELD, PluginError, Record, RecordId, Value};

/// Map one BSON value onto the document value union.
///
/// Types with no direct counterpart (decimals, binary, regex, internal
/// timestamps, ...) become their BSON display string.
pub fn bson_to_value(value: &Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(n) => Value::Int(i64::from(*n)),
        Bson::Int64(n) => Value::Int(*n),
        Bson::Double(n) => Value::Float(*n),
        Bson::String(s) | Bson::Symbol(s) | Bson::JavaScriptCode(s) => Value::String(s.clone()),
        Bson::DateTime(dt) => Value::Timestamp(dt.timestamp_millis()),
        Bson::ObjectId(oid) => Value::Id(RecordId::from_bytes(oid.bytes())),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_value).collect()),
        Bson::Document(doc) => Value::Map(document_fields(doc)),
        other => Value::String(other.to_string()),
    }
}

fn document_fields(doc: &Document) -> Vec<(String, Value)> {
    doc.iter().map(|(k, v)| (k.clone(), bson_to_value(v))).collect()
}

/// Convert a stored document, keeping its field order. `_id` must be an ObjectId.
pub fn document_to_record(doc: Document) -> Result<Record, PluginError> {
    let id = match doc.get(ID_FIELD) {
        Some(Bson::ObjectId(oid)) => RecordId::from_bytes(oid.bytes()),
        Some(other) => {
            return Err(PluginError::format_err(format!(
                "document _id is {:?}, expected ObjectId",
                other.element_type()
            )));
        }
        None => return Err(PluginError::format_err("document has no _id")),
    };

    Ok(Record { id, fields: document_fields(&doc) })
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{DateTime, doc, oid::ObjectId};

    use super::*;

    #[test]
    fn converts_nested_document_in_order() {
        let oid = ObjectId::parse_str("6650a1b2c3d4e5f601020304").unwrap();
        let doc = doc! {
            "_id": oid,
            "name": "ada",
            "n": 3_i32,
            "score": 2.5,
            "when": DateTime::from_millis(1_700_000_000_000),
            "tags": ["a", 1_i64],
            "profile": { "city": "London", "gone": Bson::Null },
        };

        let record = document_to_record(doc).unwrap();
        assert_eq!(record.id.to_hex(), "6650a1b2c3d4e5f601020304");
        assert_eq!(
            record.fields,
            vec![
                ("_id".to_string(), Value::Id(record.id)),
                ("name".to_string(), Value::String("ada".into())),
                ("n".to_string(), Value::Int(3)),
                ("score".to_string(), Value::Float(2.5)),
                ("when".to_string(), Value::Timestamp(1_700_000_000_000)),
                ("tags".to_string(), Value::Array(vec![Value::String("a".into()), Value::Int(1)])),
                (
                    "profile".to_string(),
                    Value::Map(vec![
                        ("city".to_string(), Value::String("London".into())),
                        ("gone".to_string(), Value::Null),
                    ])
                ),
            ]
        );
    }

    #[test]
    fn object_id_timestamp_matches_record_id() {
        let oid = ObjectId::new();
        let id = RecordId::from_bytes(oid.bytes());
        assert_eq!(i64::from(id.timestamp_secs()), oid.timestamp().timestamp_millis() / 1000);
    }

    #[test]
    fn rejects_non_object_id() {
        let err = document_to_record(doc! { "_id": "plain" }).unwrap_err();
        assert_eq!(err.kind(), sheetsync_api::ErrorKind::Format);
        assert!(document_to_record(doc! { "x": 1 }).is_err());
    }
}
