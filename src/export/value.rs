//! Value types and their JSON representations
//!
//! [`ValueType`] is the closed set of Redis types the exporter understands.
//! [`ValueConverter`] reads a key of a given type through a [`KeyStore`] and
//! produces an [`ExportedValue`], which knows its own JSON shape.

use serde_json::{Map, Number, Value};

use crate::error::{ExportError, Result};
use crate::store::KeyStore;

/// Storage type of a key as reported by `TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// The key vanished between SCAN and TYPE
    None,
    String,
    List,
    Set,
    SortedSet,
    Hash,
}

impl ValueType {
    /// Parse a `TYPE` reply
    ///
    /// Anything outside the five exportable kinds (`stream`, module types,
    /// ...) is an [`ExportError::UnsupportedType`].
    pub fn parse(key: &str, reply: &str) -> Result<Self> {
        match reply {
            "none" => Ok(ValueType::None),
            "string" => Ok(ValueType::String),
            "list" => Ok(ValueType::List),
            "set" => Ok(ValueType::Set),
            "zset" => Ok(ValueType::SortedSet),
            "hash" => Ok(ValueType::Hash),
            other => Err(ExportError::UnsupportedType {
                key: key.to_string(),
                type_name: other.to_string(),
            }
            .into()),
        }
    }

    /// Name as `TYPE` reports it
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::None => "none",
            ValueType::String => "string",
            ValueType::List => "list",
            ValueType::Set => "set",
            ValueType::SortedSet => "zset",
            ValueType::Hash => "hash",
        }
    }
}

/// A sorted set member with its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    pub score: f64,
    pub value: String,
}

/// The exported contents of one key
#[derive(Debug, Clone, PartialEq)]
pub enum ExportedValue {
    /// `GET` result, `null` when absent
    Text(Option<String>),
    /// List elements in store order
    List(Vec<String>),
    /// Set members in store iteration order
    Set(Vec<String>),
    /// Members ascending by rank
    SortedSet(Vec<ScoredMember>),
    /// Field/value pairs in store order
    Hash(Vec<(String, String)>),
}

impl ExportedValue {
    /// Convert into the JSON value written to the document
    pub fn into_json(self) -> Value {
        match self {
            ExportedValue::Text(text) => text.map(Value::String).unwrap_or(Value::Null),
            ExportedValue::List(items) | ExportedValue::Set(items) => {
                Value::Array(items.into_iter().map(Value::String).collect())
            }
            ExportedValue::SortedSet(members) => Value::Array(
                members
                    .into_iter()
                    .map(|m| {
                        let mut entry = Map::new();
                        entry.insert("score".to_string(), score_to_json(m.score));
                        entry.insert("value".to_string(), Value::String(m.value));
                        Value::Object(entry)
                    })
                    .collect(),
            ),
            ExportedValue::Hash(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(field, value)| (field, Value::String(value)))
                    .collect(),
            ),
        }
    }
}

/// Render a score as a JSON number
///
/// Integral scores print without a fractional part (`10`, not `10.0`).
/// JSON has no infinities, so `+inf`/`-inf` become the strings Redis uses.
pub fn score_to_json(score: f64) -> Value {
    if score.is_nan() {
        return Value::Null;
    }
    if score.is_infinite() {
        let text = if score > 0.0 { "inf" } else { "-inf" };
        return Value::String(text.to_string());
    }
    // 2^53: beyond this f64 no longer represents every integer
    if score.fract() == 0.0 && score.abs() < 9_007_199_254_740_992.0 {
        return Value::Number(Number::from(score as i64));
    }
    Number::from_f64(score).map(Value::Number).unwrap_or(Value::Null)
}

/// Reads a key of a known type and converts it
pub struct ValueConverter;

impl ValueConverter {
    /// Fetch and convert one key
    ///
    /// Returns `None` for [`ValueType::None`]; the caller skips such keys.
    pub async fn convert<S: KeyStore + ?Sized>(
        store: &mut S,
        key: &str,
        kind: ValueType,
    ) -> Result<Option<ExportedValue>> {
        let value = match kind {
            ValueType::None => return Ok(None),
            ValueType::String => ExportedValue::Text(store.get_string(key).await?),
            ValueType::List => ExportedValue::List(store.get_list(key).await?),
            ValueType::Set => ExportedValue::Set(store.get_set(key).await?),
            ValueType::SortedSet => ExportedValue::SortedSet(
                store
                    .get_sorted_set(key)
                    .await?
                    .into_iter()
                    .map(|(value, score)| ScoredMember { score, value })
                    .collect(),
            ),
            ValueType::Hash => ExportedValue::Hash(store.get_hash(key).await?),
        };
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExporterError;
    use crate::store::memory::{Entry, MemoryStore};
    use serde_json::json;

    #[test]
    fn test_parse_known_types() {
        assert_eq!(ValueType::parse("k", "none").unwrap(), ValueType::None);
        assert_eq!(ValueType::parse("k", "string").unwrap(), ValueType::String);
        assert_eq!(ValueType::parse("k", "list").unwrap(), ValueType::List);
        assert_eq!(ValueType::parse("k", "set").unwrap(), ValueType::Set);
        assert_eq!(ValueType::parse("k", "zset").unwrap(), ValueType::SortedSet);
        assert_eq!(ValueType::parse("k", "hash").unwrap(), ValueType::Hash);
        assert_eq!(ValueType::SortedSet.as_str(), "zset");
    }

    #[test]
    fn test_parse_unsupported_type() {
        let err = ValueType::parse("events", "stream").unwrap_err();
        match err {
            ExporterError::Export(ExportError::UnsupportedType { key, type_name }) => {
                assert_eq!(key, "events");
                assert_eq!(type_name, "stream");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_score_rendering() {
        assert_eq!(score_to_json(10.0), json!(10));
        assert_eq!(score_to_json(-3.0), json!(-3));
        assert_eq!(score_to_json(1.5), json!(1.5));
        assert_eq!(score_to_json(f64::INFINITY), json!("inf"));
        assert_eq!(score_to_json(f64::NEG_INFINITY), json!("-inf"));
        assert_eq!(score_to_json(1e300), json!(1e300));
    }

    #[test]
    fn test_text_json() {
        assert_eq!(ExportedValue::Text(Some("hello".into())).into_json(), json!("hello"));
        assert_eq!(ExportedValue::Text(None).into_json(), Value::Null);
    }

    #[test]
    fn test_hash_json_keeps_field_order() {
        let value = ExportedValue::Hash(vec![
            ("name".into(), "x".into()),
            ("age".into(), "30".into()),
        ]);
        let text = serde_json::to_string(&value.into_json()).unwrap();
        assert_eq!(text, r#"{"name":"x","age":"30"}"#);
    }

    #[tokio::test]
    async fn test_convert_sorted_set() {
        let mut store = MemoryStore::new().insert(
            "lb",
            Entry::ZSet(vec![("bob".into(), 20.0), ("alice".into(), 10.0)]),
        );

        let value = ValueConverter::convert(&mut store, "lb", ValueType::SortedSet)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            value.into_json(),
            json!([{"score": 10, "value": "alice"}, {"score": 20, "value": "bob"}])
        );
    }

    #[tokio::test]
    async fn test_convert_list_preserves_order() {
        let mut store = MemoryStore::new().insert(
            "mylist",
            Entry::List(vec!["a".into(), "b".into(), "c".into()]),
        );

        let value = ValueConverter::convert(&mut store, "mylist", ValueType::List)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(value.into_json(), json!(["a", "b", "c"]));
    }

    #[tokio::test]
    async fn test_convert_set() {
        let mut store =
            MemoryStore::new().insert("tags", Entry::Set(vec!["red".into(), "blue".into()]));

        let value = ValueConverter::convert(&mut store, "tags", ValueType::Set)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(value, ExportedValue::Set(vec!["red".into(), "blue".into()]));
    }

    #[tokio::test]
    async fn test_convert_none_is_skipped() {
        let mut store = MemoryStore::new();
        let value = ValueConverter::convert(&mut store, "gone", ValueType::None)
            .await
            .unwrap();
        assert!(value.is_none());
    }
}
