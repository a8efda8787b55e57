//! Helpers for reading untyped PipeRun records.
//!
//! Records come back as loose JSON objects whose shape drifts between
//! endpoints and accounts, so fields are read through small extractors
//! instead of fixed structs.

use serde_json::Value;

/// A family of fields that may hold the same kind of value in several shapes:
/// a scalar (`email`), or a collection (`emails`) of strings or of objects
/// carrying the value under one of `item_keys`.
#[derive(Debug, Clone, Copy)]
pub struct FieldFamily {
    pub scalar: &'static str,
    pub collection: &'static str,
    pub item_keys: &'static [&'static str],
}

/// `email` / `emails[]` (strings, `{value}` or `{email}` items).
pub const EMAIL_FIELDS: FieldFamily = FieldFamily {
    scalar: "email",
    collection: "emails",
    item_keys: &["value", "email"],
};

/// `phone` / `phones[]` (strings, `{value}` or `{phone}` items).
pub const PHONE_FIELDS: FieldFamily = FieldFamily {
    scalar: "phone",
    collection: "phones",
    item_keys: &["value", "phone"],
};

/// Collect every string the record holds for a field family, in field order.
pub fn string_candidates<'a>(record: &'a Value, family: &FieldFamily) -> Vec<&'a str> {
    let mut out = Vec::new();

    if let Some(s) = record.get(family.scalar).and_then(Value::as_str) {
        out.push(s);
    }

    if let Some(items) = record.get(family.collection).and_then(Value::as_array) {
        for item in items {
            let value = item.as_str().or_else(|| {
                family
                    .item_keys
                    .iter()
                    .find_map(|key| item.get(*key).and_then(Value::as_str))
            });
            if let Some(s) = value {
                out.push(s);
            }
        }
    }

    out
}

/// The record's identifier, when it is a positive integer.
pub fn record_id(record: &Value) -> Option<i64> {
    record
        .get("id")
        .and_then(Value::as_i64)
        .filter(|id| *id > 0)
}

/// Strip the `{data: ...}` envelope PipeRun wraps single records in.
pub fn unwrap_data(response: &Value) -> &Value {
    match response.get("data") {
        Some(data) if !data.is_null() => data,
        _ => response,
    }
}

/// Identifier of a freshly created record (`data.id`, falling back to `id`).
pub fn created_id(response: &Value) -> Option<i64> {
    response
        .get("data")
        .and_then(record_id)
        .or_else(|| record_id(response))
}

/// First non-empty string among `keys`, rendering numbers as text.
pub fn first_text(record: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| match record.get(*key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_candidates_from_mixed_shapes() {
        let person = json!({
            "email": "main@x.com",
            "emails": ["a@x.com", {"value": "b@x.com"}, {"email": "c@x.com"}, {"other": "d@x.com"}, 7]
        });
        assert_eq!(
            string_candidates(&person, &EMAIL_FIELDS),
            vec!["main@x.com", "a@x.com", "b@x.com", "c@x.com"]
        );
    }

    #[test]
    fn test_phone_candidates_ignore_non_strings() {
        let person = json!({"phone": 5511999, "phones": [{"phone": "+55 11 9999"}, null]});
        assert_eq!(string_candidates(&person, &PHONE_FIELDS), vec!["+55 11 9999"]);
    }

    #[test]
    fn test_record_id_requires_positive_integer() {
        assert_eq!(record_id(&json!({"id": 42})), Some(42));
        assert_eq!(record_id(&json!({"id": "42"})), None);
        assert_eq!(record_id(&json!({"id": 0})), None);
        assert_eq!(record_id(&json!({"id": 1.5})), None);
        assert_eq!(record_id(&json!({})), None);
    }

    #[test]
    fn test_created_id_reads_envelope_first() {
        assert_eq!(created_id(&json!({"data": {"id": 9}, "id": 1})), Some(9));
        assert_eq!(created_id(&json!({"id": 3})), Some(3));
        assert_eq!(created_id(&json!({"success": true})), None);
    }

    #[test]
    fn test_unwrap_data() {
        let wrapped = json!({"data": {"deal_id": 5}});
        assert_eq!(unwrap_data(&wrapped), &json!({"deal_id": 5}));

        let bare = json!({"deal_id": 5});
        assert_eq!(unwrap_data(&bare), &bare);
    }

    #[test]
    fn test_first_text() {
        let company = json!({"website": "", "site": "acme.io", "name": 12});
        assert_eq!(first_text(&company, &["website", "site"]), "acme.io");
        assert_eq!(first_text(&company, &["name"]), "12");
        assert_eq!(first_text(&company, &["missing"]), "");
    }
}
