//! Query string parsing with nested bracket expansion.
//!
//! Each `key=value` pair is parsed with [`serde_qs`] in non-strict mode, then the
//! pairs are merged in order of appearance:
//!
//! - `a=1&b=2` becomes `{"a": "1", "b": "2"}`
//! - `shoe[color]=blue&shoe[type]=converse` becomes `{"shoe": {"color": "blue", "type": "converse"}}`
//! - encoded brackets nest the same way, `shoe%5Bcolor%5D=blue` becomes `{"shoe": {"color": "blue"}}`
//! - `+` and percent escapes are decoded, so `q=tobi+ferret` becomes `{"q": "tobi ferret"}`
//! - a repeated key collects its values, `tag=a&tag=b` becomes `{"tag": ["a", "b"]}`
//! - `ids[]=1&ids[]=2` and `ids[0]=1&ids[1]=2` become `{"ids": ["1", "2"]}`, items keep the order they appear in
//! - a key used both as a scalar and as an object keeps both, `a=1&a[b]=2` becomes `{"a": ["1", {"b": "2"}]}`
//!
//! Every leaf stays a string, typing is the decoder's job. Keys nest at most
//! [`MAX_DEPTH`] levels deep, deeper brackets stay part of the key.

use crate::ConnError;
use serde_json::{Map, Value};

/// How many bracket levels a key may expand into.
const MAX_DEPTH: usize = 5;

/// Parses a raw query string, or a url encoded form body, into a structured value.
///
/// An empty query parses into an empty object.
pub fn parse_query(query: &str) -> Result<Value, ConnError> {
    let config = serde_qs::Config::new(MAX_DEPTH, false);

    let mut parsed = Map::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let pair: Map<String, Value> = config.deserialize_str(pair).map_err(ConnError::invalid_query)?;
        merge_object(&mut parsed, pair);
    }

    Ok(Value::Object(parsed))
}

fn merge_object(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match target.get_mut(&key) {
            Some(existing) => merge(existing, value),
            None => {
                target.insert(key, value);
            }
        }
    }
}

fn merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => merge_object(target, source),
        (Value::Array(target), Value::Array(source)) => target.extend(source),
        (Value::Array(target), source) => target.push(source),
        (target, Value::Array(source)) => {
            let mut items = vec![target.take()];
            items.extend(source);
            *target = Value::Array(items);
        }
        (target, source) => {
            *target = Value::Array(vec![target.take(), source]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_query() {
        assert_eq!(parse_query("").unwrap(), json!({}));
        assert_eq!(parse_query("&&").unwrap(), json!({}));
    }

    #[test]
    fn test_flat_query() {
        assert_eq!(parse_query("a=1&b=two").unwrap(), json!({"a": "1", "b": "two"}));
    }

    #[test]
    fn test_plus_is_space() {
        assert_eq!(parse_query("q=tobi+ferret").unwrap(), json!({"q": "tobi ferret"}));
    }

    #[test]
    fn test_nested_query() {
        let value = parse_query("order=desc&shoe[color]=blue&shoe[type]=converse").unwrap();
        assert_eq!(value, json!({"order": "desc", "shoe": {"color": "blue", "type": "converse"}}));
    }

    #[test]
    fn test_encoded_brackets_nest() {
        let value = parse_query("shoe%5Bcolor%5D=blue&shoe%5Btype%5D=converse").unwrap();
        assert_eq!(value, json!({"shoe": {"color": "blue", "type": "converse"}}));
    }

    #[test]
    fn test_repeated_key_collects_values() {
        assert_eq!(parse_query("tag=a&tag=b").unwrap(), json!({"tag": ["a", "b"]}));
        assert_eq!(parse_query("tag=a&tag=b&tag=c").unwrap(), json!({"tag": ["a", "b", "c"]}));
    }

    #[test]
    fn test_list_notation() {
        assert_eq!(parse_query("ids[]=1&ids[]=2").unwrap(), json!({"ids": ["1", "2"]}));
        assert_eq!(parse_query("ids[0]=1&ids[1]=2").unwrap(), json!({"ids": ["1", "2"]}));
        assert_eq!(parse_query("ids[]=1&ids=2").unwrap(), json!({"ids": ["1", "2"]}));
    }

    #[test]
    fn test_scalar_and_nested_value_for_one_key() {
        assert_eq!(parse_query("a=1&a[b]=2").unwrap(), json!({"a": ["1", {"b": "2"}]}));
    }

    #[test]
    fn test_repeated_nested_key() {
        let value = parse_query("shoe[color]=blue&shoe[color]=red").unwrap();
        assert_eq!(value, json!({"shoe": {"color": ["blue", "red"]}}));
    }
}
