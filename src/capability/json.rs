//! JSON capability backed by `serde_json`.

use serde_json::Value;

use crate::error::JsonError;

pub trait Json: Send + Sync {
    /// Parse JSON text into a structured value.
    fn loads(&self, text: &str) -> Result<Value, JsonError>;

    /// Serialize a value to compact JSON text, preserving key order.
    fn dumps(&self, value: &Value) -> Result<String, JsonError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StandardJson;

impl Json for StandardJson {
    fn loads(&self, text: &str) -> Result<Value, JsonError> {
        serde_json::from_str(text).map_err(JsonError::Parse)
    }

    fn dumps(&self, value: &Value) -> Result<String, JsonError> {
        serde_json::to_string(value).map_err(JsonError::Serialize)
    }
}

/// Resolve a dot-separated path such as `data.risk_code`.
///
/// Numeric segments index into arrays. An empty path returns the value itself.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOCUMENT: &str =
        r#"{"retcode":0,"message":"OK","data":{"code":"Fxq6j","risk_code":375,"success":1}}"#;

    #[test]
    fn test_loads_exposes_nested_fields() {
        let value = StandardJson.loads(DOCUMENT).unwrap();
        assert_eq!(lookup(&value, "retcode"), Some(&json!(0)));
        assert_eq!(lookup(&value, "message"), Some(&json!("OK")));
        assert_eq!(lookup(&value, "data.risk_code"), Some(&json!(375)));
        assert_eq!(lookup(&value, "data.missing"), None);
    }

    #[test]
    fn test_lookup_indexes_arrays() {
        let value = json!({"items": [{"id": 1}, {"id": 2}]});
        assert_eq!(lookup(&value, "items.1.id"), Some(&json!(2)));
        assert_eq!(lookup(&value, "items.x"), None);
        assert_eq!(lookup(&value, "items.9"), None);
        assert_eq!(lookup(&value, ""), Some(&value));
    }

    #[test]
    fn test_dumps_preserves_key_order() {
        let value = StandardJson.loads(DOCUMENT).unwrap();
        assert_eq!(StandardJson.dumps(&value).unwrap(), DOCUMENT);
    }

    #[test]
    fn test_loads_rejects_trailing_garbage() {
        assert!(matches!(
            StandardJson.loads("{\"a\":1} x"),
            Err(JsonError::Parse(_))
        ));
    }
}
