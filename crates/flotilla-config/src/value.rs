use serde_yml::value::{Tag, TaggedValue};

/// One node of a parsed account or fragment document.
///
/// Plain YAML parses to the `Null`/`Bool`/`Number`/`String`/`Sequence`/
/// `Mapping` variants. The two custom tags parse to dedicated leaf variants
/// instead of plain strings: `!Sub "..."` becomes [`ConfigValue::Sub`] and
/// `!Ref name` / `!Ref name[i]` becomes [`ConfigValue::Ref`]. Mappings keep
/// their key order from the source document.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(serde_yml::Number),
    String(String),
    Sequence(Vec<ConfigValue>),
    Mapping(Vec<(String, ConfigValue)>),

    /// A `!Sub` template string with `${name}` placeholders.
    Sub(String),

    /// A `!Ref` variable reference, optionally indexed into a sequence.
    Ref { name: String, index: Option<usize> },
}

impl ConfigValue {
    /// Look up a key in a mapping. Returns `None` for non-mapping values.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        match self {
            ConfigValue::Mapping(entries) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[(String, ConfigValue)]> {
        match self {
            ConfigValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, ConfigValue::Mapping(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Returns `true` for leaf values (everything except containers).
    pub fn is_scalar(&self) -> bool {
        !matches!(self, ConfigValue::Sequence(_) | ConfigValue::Mapping(_))
    }

    /// The string form used when interpolating this value into a `!Sub`
    /// template. Containers render in YAML flow style; unresolved tag
    /// leaves render as their source text.
    pub fn scalar_string(&self) -> String {
        match self {
            ConfigValue::Null => "null".to_string(),
            ConfigValue::Bool(b) => b.to_string(),
            ConfigValue::Number(n) => n.to_string(),
            ConfigValue::String(s) => s.clone(),
            ConfigValue::Sequence(items) => {
                let parts: Vec<String> = items.iter().map(|i| i.scalar_string()).collect();
                format!("[{}]", parts.join(", "))
            }
            ConfigValue::Mapping(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{k}: {}", v.scalar_string()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            ConfigValue::Sub(template) => template.clone(),
            ConfigValue::Ref { name, index } => ref_source_text(name, *index),
        }
    }

    /// Convert back to a `serde_yml::Value` for display. Unresolved tag
    /// leaves are re-emitted as `!Sub` / `!Ref` tagged scalars.
    pub fn to_yaml_value(&self) -> serde_yml::Value {
        match self {
            ConfigValue::Null => serde_yml::Value::Null,
            ConfigValue::Bool(b) => serde_yml::Value::Bool(*b),
            ConfigValue::Number(n) => serde_yml::Value::Number(n.clone()),
            ConfigValue::String(s) => serde_yml::Value::String(s.clone()),
            ConfigValue::Sequence(items) => {
                serde_yml::Value::Sequence(items.iter().map(|i| i.to_yaml_value()).collect())
            }
            ConfigValue::Mapping(entries) => {
                let mut mapping = serde_yml::Mapping::new();
                for (key, value) in entries {
                    mapping.insert(
                        serde_yml::Value::String(key.clone()),
                        value.to_yaml_value(),
                    );
                }
                serde_yml::Value::Mapping(mapping)
            }
            ConfigValue::Sub(template) => tagged("Sub", template.clone()),
            ConfigValue::Ref { name, index } => tagged("Ref", ref_source_text(name, *index)),
        }
    }

    /// Convert to a `serde_json::Value`. JSON has no tag syntax, so
    /// unresolved tag leaves render as their source text.
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            ConfigValue::Null => serde_json::Value::Null,
            ConfigValue::Bool(b) => serde_json::Value::Bool(*b),
            ConfigValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    serde_json::Value::from(i)
                } else if let Some(u) = n.as_u64() {
                    serde_json::Value::from(u)
                } else if let Some(f) = n.as_f64() {
                    serde_json::Number::from_f64(f)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                } else {
                    serde_json::Value::Null
                }
            }
            ConfigValue::String(s) => serde_json::Value::String(s.clone()),
            ConfigValue::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(|i| i.to_json_value()).collect())
            }
            ConfigValue::Mapping(entries) => {
                let mut map = serde_json::Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json_value());
                }
                serde_json::Value::Object(map)
            }
            ConfigValue::Sub(template) => serde_json::Value::String(template.clone()),
            ConfigValue::Ref { name, index } => {
                serde_json::Value::String(ref_source_text(name, *index))
            }
        }
    }
}

fn tagged(tag: &str, value: String) -> serde_yml::Value {
    serde_yml::Value::Tagged(Box::new(TaggedValue {
        tag: Tag::new(tag),
        value: serde_yml::Value::String(value),
    }))
}

fn ref_source_text(name: &str, index: Option<usize>) -> String {
    match index {
        Some(i) => format!("{name}[{i}]"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mapping() -> ConfigValue {
        ConfigValue::Mapping(vec![
            ("name".to_string(), ConfigValue::String("app".to_string())),
            (
                "count".to_string(),
                ConfigValue::Number(serde_yml::Number::from(3)),
            ),
        ])
    }

    #[test]
    fn test_get_existing_key() {
        let value = sample_mapping();
        assert_eq!(value.get("name").and_then(|v| v.as_str()), Some("app"));
    }

    #[test]
    fn test_get_missing_key() {
        let value = sample_mapping();
        assert!(value.get("missing").is_none());
    }

    #[test]
    fn test_get_on_non_mapping() {
        let value = ConfigValue::String("not a mapping".to_string());
        assert!(value.get("anything").is_none());
    }

    #[test]
    fn test_scalar_string_forms() {
        assert_eq!(ConfigValue::Null.scalar_string(), "null");
        assert_eq!(ConfigValue::Bool(true).scalar_string(), "true");
        assert_eq!(
            ConfigValue::Number(serde_yml::Number::from(42)).scalar_string(),
            "42"
        );
        assert_eq!(
            ConfigValue::String("plain".to_string()).scalar_string(),
            "plain"
        );
    }

    #[test]
    fn test_scalar_string_flow_style_containers() {
        let seq = ConfigValue::Sequence(vec![
            ConfigValue::String("a".to_string()),
            ConfigValue::String("b".to_string()),
        ]);
        assert_eq!(seq.scalar_string(), "[a, b]");

        let map = ConfigValue::Mapping(vec![(
            "k".to_string(),
            ConfigValue::String("v".to_string()),
        )]);
        assert_eq!(map.scalar_string(), "{k: v}");
    }

    #[test]
    fn test_scalar_string_unresolved_tags() {
        let sub = ConfigValue::Sub("app-${env}".to_string());
        assert_eq!(sub.scalar_string(), "app-${env}");

        let indexed = ConfigValue::Ref {
            name: "zones".to_string(),
            index: Some(1),
        };
        assert_eq!(indexed.scalar_string(), "zones[1]");
    }

    #[test]
    fn test_to_yaml_value_round_trips_tags() {
        let sub = ConfigValue::Sub("x-${y}".to_string());
        let yaml = serde_yml::to_string(&sub.to_yaml_value()).unwrap();
        assert!(yaml.contains("!Sub"), "expected tag in output: {yaml}");
    }

    #[test]
    fn test_to_json_value_renders_tags_as_text() {
        let reference = ConfigValue::Ref {
            name: "zones".to_string(),
            index: Some(0),
        };
        assert_eq!(
            reference.to_json_value(),
            serde_json::Value::String("zones[0]".to_string())
        );
    }

    #[test]
    fn test_to_json_value_mapping_preserves_entries() {
        let json = sample_mapping().to_json_value();
        assert_eq!(json["name"], "app");
        assert_eq!(json["count"], 3);
    }
}
