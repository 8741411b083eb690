//! The YAML table that may follow a chapter's `---` line.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use svnm_data::Variables;

use crate::ScriptError;

/// Chapter metadata. Every key is optional; any other key is rejected.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metadata {
    #[serde(rename = "전역변수", default)]
    pub global_variables: Option<Variables>,
    #[serde(rename = "지역변수", default)]
    pub local_variables: Option<Variables>,
    #[serde(rename = "변수범위", default)]
    pub scope: Option<String>,
    /// Option key (with an optional guard prefix) to raw command strings.
    #[serde(rename = "선택지", default)]
    pub options: Option<OrderedMap<Vec<String>>>,
    /// Event name to raw command strings.
    #[serde(rename = "이벤트", default)]
    pub events: Option<BTreeMap<String, Vec<String>>>,
}

/// A string-keyed map that keeps the order its entries were written in.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with string keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    if entries.iter().any(|(existing, _)| *existing == key) {
                        return Err(de::Error::custom(format!("duplicate key `{key}`")));
                    }
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// Parse and validate a chapter's metadata. Absent or blank text is an empty table.
///
/// # Errors
/// Returns [`ScriptError::Schema`] for malformed YAML, unknown keys, or mistyped values.
pub fn parse_metadata(chapter: &str, text: Option<&str>) -> Result<Metadata, ScriptError> {
    match text.map(str::trim) {
        None | Some("") => Ok(Metadata::default()),
        Some(yaml) => serde_yaml::from_str(yaml).map_err(|source| ScriptError::Schema {
            chapter: chapter.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svnm_data::Value;

    #[test]
    fn all_keys_are_read() {
        let yaml = "\
전역변수:
  돈: 3
  이름: 철수
지역변수:
  봤다: false
  목록: [1, 'a', true]
변수범위: 1장
선택지:
  나중: [이동(#B)]
  (참)이면, 먼저:
    - 이동(#A)
이벤트:
  입장: [출력('hi')]
";
        let meta = parse_metadata("S", Some(yaml)).unwrap();
        let globals = meta.global_variables.unwrap();
        assert_eq!(globals["돈"], Value::Number(3.0));
        assert_eq!(globals["이름"], Value::from("철수"));
        let locals = meta.local_variables.unwrap();
        assert_eq!(locals["봤다"], Value::Bool(false));
        assert_eq!(
            locals["목록"],
            Value::List(vec![Value::Number(1.0), Value::from("a"), Value::Bool(true)])
        );
        assert_eq!(meta.scope.as_deref(), Some("1장"));
        let keys: Vec<_> = meta.options.unwrap().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, ["나중", "(참)이면, 먼저"]);
        assert_eq!(meta.events.unwrap()["입장"], ["출력('hi')"]);
    }

    #[test]
    fn nested_maps_are_values() {
        let meta = parse_metadata("S", Some("전역변수:\n  가방:\n    칼: 1\n")).unwrap();
        let bag = &meta.global_variables.unwrap()["가방"];
        assert!(matches!(bag, Value::Map(m) if m["칼"] == Value::Number(1.0)));
    }

    #[test]
    fn blank_metadata_is_empty() {
        assert_eq!(parse_metadata("S", None).unwrap(), Metadata::default());
        assert_eq!(parse_metadata("S", Some("  \n")).unwrap(), Metadata::default());
    }

    #[test]
    fn unknown_keys_are_schema_errors() {
        let err = parse_metadata("S", Some("모르는키: 1")).unwrap_err();
        assert!(matches!(err, ScriptError::Schema { ref chapter, .. } if chapter == "S"));
        assert!(!err.is_syntax());
    }

    #[test]
    fn mistyped_values_are_schema_errors() {
        assert!(matches!(
            parse_metadata("S", Some("선택지: [a, b]")),
            Err(ScriptError::Schema { .. })
        ));
        assert!(matches!(
            parse_metadata("S", Some("이벤트:\n  입장: 출력")),
            Err(ScriptError::Schema { .. })
        ));
    }
}
