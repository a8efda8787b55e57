//! Tool argument helpers.
//!
//! MCP clients are loose about numbers: ids frequently arrive as `"94766"`.
//! These helpers accept both spellings and turn missing values into
//! invalid-parameter errors with the argument's name.

use crate::error::{PipeRunApiError, PipeRunResult};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};

/// Parse a numeric-looking string (trimmed, non-empty) into a JSON number.
fn parse_number(s: &str) -> Option<Number> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Some(Number::from(n));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Whether a pass-through argument key holds a number upstream.
fn is_numeric_key(key: &str) -> bool {
    key.ends_with("_id") || matches!(key, "page" | "show" | "status")
}

/// Coerce numeric-looking strings under `*_id`, `page`, `show` and `status` keys to numbers.
pub fn coerce_numeric_args(args: &mut Map<String, Value>) {
    for (key, value) in args.iter_mut() {
        if !is_numeric_key(key) {
            continue;
        }
        if let Value::String(s) = value {
            if let Some(n) = parse_number(s) {
                *value = Value::Number(n);
            }
        }
    }
}

/// Read an integer from a number or a numeric string.
pub fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// `deserialize_with` for optional ids: numbers and numeric strings are
/// accepted, anything else reads as absent.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_id))
}

/// `deserialize_with` for optional amounts, keeping the caller's number representation.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => Some(n),
        Some(Value::String(s)) => parse_number(&s),
        _ => None,
    })
}

/// Owner ids from a candidate list; entries that are not integers are dropped.
pub fn parse_owner_candidates(values: &[Value]) -> Vec<i64> {
    values.iter().filter_map(as_id).collect()
}

/// Trimmed text, or `None` when absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn require_text(value: Option<&str>, field: &str) -> PipeRunResult<String> {
    non_blank(value)
        .ok_or_else(|| PipeRunApiError::invalid(format!("'{}' (string) is required", field)))
}

pub fn require_id(value: Option<i64>, field: &str) -> PipeRunResult<i64> {
    value.ok_or_else(|| PipeRunApiError::invalid(format!("'{}' (number) is required", field)))
}

/// Trimmed non-empty string field of a pass-through map.
pub fn map_text(args: &Map<String, Value>, key: &str) -> Option<String> {
    non_blank(args.get(key).and_then(Value::as_str))
}

/// Integer field of a pass-through map (after coercion).
pub fn map_id(args: &Map<String, Value>, key: &str) -> Option<i64> {
    args.get(key).filter(|v| v.is_number()).and_then(as_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_coerce_numeric_args() {
        let mut args = object(json!({
            "deal_id": "94766",
            "page": " 2 ",
            "show": "50",
            "status": "1",
            "owner_id": 7,
            "title": "123",
            "stage_id": "abc",
            "person_id": "",
            "value": "10.5"
        }));
        coerce_numeric_args(&mut args);

        assert_eq!(args["deal_id"], json!(94766));
        assert_eq!(args["page"], json!(2));
        assert_eq!(args["show"], json!(50));
        assert_eq!(args["status"], json!(1));
        assert_eq!(args["owner_id"], json!(7));
        // Only id-like keys are touched
        assert_eq!(args["title"], json!("123"));
        assert_eq!(args["value"], json!("10.5"));
        assert_eq!(args["stage_id"], json!("abc"));
        assert_eq!(args["person_id"], json!(""));
    }

    #[test]
    fn test_coerce_keeps_fractions() {
        let mut args = object(json!({"lead_id": "1.5"}));
        coerce_numeric_args(&mut args);
        assert_eq!(args["lead_id"], json!(1.5));
    }

    #[test]
    fn test_as_id() {
        assert_eq!(as_id(&json!(5)), Some(5));
        assert_eq!(as_id(&json!(5.0)), Some(5));
        assert_eq!(as_id(&json!(5.5)), None);
        assert_eq!(as_id(&json!(" 42 ")), Some(42));
        assert_eq!(as_id(&json!("x")), None);
        assert_eq!(as_id(&json!(null)), None);
    }

    #[derive(Debug, Deserialize)]
    struct Args {
        #[serde(default, deserialize_with = "lenient_id")]
        deal_id: Option<i64>,
        #[serde(default, deserialize_with = "lenient_number")]
        value: Option<Number>,
    }

    #[test]
    fn test_lenient_deserializers() {
        let args: Args = serde_json::from_value(json!({"deal_id": "12", "value": 1500})).unwrap();
        assert_eq!(args.deal_id, Some(12));
        assert_eq!(args.value, Some(Number::from(1500)));

        let args: Args = serde_json::from_value(json!({"deal_id": "nope", "value": "99.9"})).unwrap();
        assert_eq!(args.deal_id, None);
        assert_eq!(args.value.and_then(|n| n.as_f64()), Some(99.9));

        let args: Args = serde_json::from_value(json!({})).unwrap();
        assert_eq!(args.deal_id, None);
        assert_eq!(args.value, None);
    }

    #[test]
    fn test_parse_owner_candidates() {
        let values = vec![json!(11), json!("22"), json!("abc"), json!(null), json!(33)];
        assert_eq!(parse_owner_candidates(&values), vec![11, 22, 33]);
    }

    #[test]
    fn test_required_values() {
        assert_eq!(require_text(Some("  Acme "), "title").unwrap(), "Acme");
        let err = require_text(Some("   "), "title").unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter: 'title' (string) is required");

        assert_eq!(require_id(Some(3), "deal_id").unwrap(), 3);
        assert!(matches!(
            require_id(None, "deal_id"),
            Err(PipeRunApiError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_map_accessors() {
        let args = object(json!({"title": " Deal ", "blank": " ", "pipeline_id": 4, "stage_id": "5"}));
        assert_eq!(map_text(&args, "title").as_deref(), Some("Deal"));
        assert_eq!(map_text(&args, "blank"), None);
        assert_eq!(map_id(&args, "pipeline_id"), Some(4));
        // Strings are not numbers until coerced
        assert_eq!(map_id(&args, "stage_id"), None);
    }
}
