//! Keyed argument pool built from the query string and the JSON body.

use crate::error::{GatewayError, GatewayResult};
use percent_encoding::percent_decode_str;
use serde_json::{Map, Number, Value};
use tracing::warn;

/// Per-request map from argument name to value.
///
/// Query parameters go in first; top-level keys of a JSON object body then
/// overwrite them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentPool {
    entries: Map<String, Value>,
}

impl ArgumentPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw (still percent-encoded) query string.
    ///
    /// `a.b=1` nests under `a`. A key without a value stores `null`.
    pub fn from_query(query: &str) -> GatewayResult<Self> {
        let mut pool = Self::new();

        for param in query.split('&').filter(|p| !p.is_empty()) {
            let mut parts = param.split('=');
            let key = parts.next().unwrap_or_default();
            let value = parts.next();
            if parts.next().is_some() {
                return Err(GatewayError::MalformedQuery(query.to_string()));
            }

            let value = value
                .map(decode)
                .filter(|v| !v.is_empty())
                .map(|v| infer_value(&v))
                .unwrap_or(Value::Null);

            if !pool.insert_path(&decode(key), value) {
                return Err(GatewayError::MalformedQuery(query.to_string()));
            }
        }

        Ok(pool)
    }

    /// Merge a request body into the pool.
    ///
    /// An empty body is ignored, and so is one that is not valid JSON. Valid
    /// JSON must be an object.
    pub fn merge_body(&mut self, body: &[u8]) -> GatewayResult<()> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        let parsed: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(err) => {
                warn!("Body parse fail: {}", err);
                return Ok(());
            }
        };

        match parsed {
            Value::Object(map) => {
                self.entries.extend(map);
                Ok(())
            }
            _ => Err(GatewayError::InvalidBodyShape),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert to a JSON object
    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }

    // Returns false when a path segment already holds a non-object value.
    fn insert_path(&mut self, key: &str, value: Value) -> bool {
        let mut parents: Vec<&str> = key.split('.').collect();
        let leaf = parents.pop().unwrap_or_default();

        let mut container = &mut self.entries;
        for parent in parents {
            let entry = container
                .entry(parent)
                .or_insert_with(|| Value::Object(Map::new()));
            container = match entry {
                Value::Object(map) => map,
                _ => return false,
            };
        }

        container.insert(leaf.to_string(), value);
        true
    }
}

/// Infer the type of a query value: integer, then boolean, then float, then
/// the raw string. The first successful parse wins.
pub fn infer_value(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    if let Some(boolean) = parse_bool(raw) {
        return Value::Bool(boolean);
    }
    if let Some(number) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    Value::String(raw.to_string())
}

// Case-insensitive, but only for the two literal words.
fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_query() {
        let pool = ArgumentPool::from_query("a=1&b.c=true&b.d=x").unwrap();
        assert_eq!(pool.into_value(), json!({"a": 1, "b": {"c": true, "d": "x"}}));
    }

    #[test]
    fn test_deep_nesting_reuses_parents() {
        let pool = ArgumentPool::from_query("opts.a.b=1&opts.a.c=2&opts.d=3").unwrap();
        assert_eq!(pool.into_value(), json!({"opts": {"a": {"b": 1, "c": 2}, "d": 3}}));
    }

    #[test]
    fn test_value_inference_order() {
        assert_eq!(infer_value("42"), json!(42));
        assert_eq!(infer_value("-7"), json!(-7));
        assert_eq!(infer_value("true"), json!(true));
        assert_eq!(infer_value("false"), json!(false));
        assert_eq!(infer_value("1.5"), json!(1.5));
        assert_eq!(infer_value("1e3"), json!(1000.0));
        assert_eq!(infer_value("True"), json!(true));
        assert_eq!(infer_value("TRUE"), json!(true));
        assert_eq!(infer_value("fAlSe"), json!(false));
        assert_eq!(infer_value("yes"), json!("yes"));
        assert_eq!(infer_value("NaN"), json!("NaN"));
        assert_eq!(infer_value("hello"), json!("hello"));
    }

    #[test]
    fn test_bare_and_empty_values_are_null() {
        let pool = ArgumentPool::from_query("force&name=").unwrap();
        assert_eq!(pool.get("force"), Some(&Value::Null));
        assert_eq!(pool.get("name"), Some(&Value::Null));
    }

    #[test]
    fn test_empty_entries_skipped() {
        assert!(ArgumentPool::from_query("&&").unwrap().is_empty());

        let pool = ArgumentPool::from_query("&a=1&&").unwrap();
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_percent_decoding() {
        let pool = ArgumentPool::from_query("cmd=echo%20%22hi%22&my%2Ekey=1").unwrap();
        assert_eq!(pool.get("cmd"), Some(&json!("echo \"hi\"")));
        assert_eq!(pool.get("my.key"), None);
        assert_eq!(pool.into_value(), json!({"cmd": "echo \"hi\"", "my": {"key": 1}}));
    }

    #[test]
    fn test_too_many_equals() {
        let err = ArgumentPool::from_query("a=b=c").unwrap_err();
        assert_eq!(err.to_string(), "Invalid query parameters string: a=b=c");
    }

    #[test]
    fn test_scalar_parent_conflict() {
        let err = ArgumentPool::from_query("a=1&a.b=2").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedQuery(_)));
    }

    #[test]
    fn test_body_overwrites_query() {
        let mut pool = ArgumentPool::from_query("name=query&keep=1").unwrap();
        pool.merge_body(br#"{"name": "body", "value": [1, 2]}"#).unwrap();

        assert_eq!(pool.get("name"), Some(&json!("body")));
        assert_eq!(pool.get("keep"), Some(&json!(1)));
        assert_eq!(pool.get("value"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_body_must_be_object() {
        let mut pool = ArgumentPool::new();
        let err = pool.merge_body(b"[1, 2]").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidBodyShape));
        assert!(matches!(pool.merge_body(b"3"), Err(GatewayError::InvalidBodyShape)));
    }

    #[test]
    fn test_malformed_or_empty_body_ignored() {
        let mut pool = ArgumentPool::from_query("a=1").unwrap();
        pool.merge_body(b"{not json").unwrap();
        pool.merge_body(b"  \n").unwrap();
        pool.merge_body(b"").unwrap();
        assert_eq!(pool.into_value(), json!({"a": 1}));
    }
}
