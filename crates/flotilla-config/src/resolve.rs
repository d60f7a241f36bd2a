use crate::value::ConfigValue;
use crate::ConfigError;

/// Variable bindings for one include resolution.
///
/// Bindings are scoped to a single include directive; they never leak into
/// sibling includes. Iteration follows insertion order, which makes `!Sub`
/// substitution deterministic.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: Vec<(String, ConfigValue)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a binding. Re-binding an existing name replaces its value but
    /// keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: ConfigValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve every tag leaf in a tree against the given bindings.
///
/// Containers are rebuilt node by node; plain leaves pass through
/// unchanged. `!Sub` leaves become strings, `!Ref` leaves become the bound
/// value (or the indexed element).
pub fn resolve_tree(value: &ConfigValue, bindings: &Bindings) -> Result<ConfigValue, ConfigError> {
    match value {
        ConfigValue::Sub(template) => Ok(ConfigValue::String(resolve_template(
            template, bindings,
        ))),
        ConfigValue::Ref { name, index } => resolve_reference(name, *index, bindings),
        ConfigValue::Sequence(items) => {
            let resolved: Vec<ConfigValue> = items
                .iter()
                .map(|item| resolve_tree(item, bindings))
                .collect::<Result<_, _>>()?;
            Ok(ConfigValue::Sequence(resolved))
        }
        ConfigValue::Mapping(entries) => {
            let resolved: Vec<(String, ConfigValue)> = entries
                .iter()
                .map(|(key, value)| Ok((key.clone(), resolve_tree(value, bindings)?)))
                .collect::<Result<_, ConfigError>>()?;
            Ok(ConfigValue::Mapping(resolved))
        }
        other => Ok(other.clone()),
    }
}

/// Replace `${name}` placeholders with each binding's string form.
///
/// One pass per binding, in insertion order; placeholders with no matching
/// binding are left verbatim.
fn resolve_template(template: &str, bindings: &Bindings) -> String {
    let mut result = template.to_string();
    for (name, value) in bindings.iter() {
        let placeholder = format!("${{{name}}}");
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, &value.scalar_string());
        }
    }
    result
}

/// Look up a `!Ref` target, applying the optional sequence index.
fn resolve_reference(
    name: &str,
    index: Option<usize>,
    bindings: &Bindings,
) -> Result<ConfigValue, ConfigError> {
    let value = bindings
        .get(name)
        .ok_or_else(|| ConfigError::ReferenceNotFound {
            name: name.to_string(),
        })?;

    let Some(index) = index else {
        return Ok(value.clone());
    };

    let ConfigValue::Sequence(items) = value else {
        return Err(ConfigError::TypeMismatch {
            name: name.to_string(),
        });
    };

    items
        .get(index)
        .cloned()
        .ok_or_else(|| ConfigError::IndexOutOfRange {
            name: name.to_string(),
            index,
            len: items.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_document;

    fn bindings_of(pairs: &[(&str, ConfigValue)]) -> Bindings {
        let mut bindings = Bindings::new();
        for (name, value) in pairs {
            bindings.insert(*name, value.clone());
        }
        bindings
    }

    #[test]
    fn test_sub_substitutes_bound_placeholder() {
        let bindings = bindings_of(&[("env", ConfigValue::String("prod".to_string()))]);
        let resolved = resolve_tree(&ConfigValue::Sub("app-${env}".to_string()), &bindings).unwrap();
        assert_eq!(resolved, ConfigValue::String("app-prod".to_string()));
    }

    #[test]
    fn test_sub_leaves_unbound_placeholder_verbatim() {
        let bindings = bindings_of(&[("env", ConfigValue::String("prod".to_string()))]);
        let resolved =
            resolve_tree(&ConfigValue::Sub("${env}-${tier}".to_string()), &bindings).unwrap();
        assert_eq!(resolved, ConfigValue::String("prod-${tier}".to_string()));
    }

    #[test]
    fn test_sub_with_no_bindings_is_verbatim() {
        let resolved =
            resolve_tree(&ConfigValue::Sub("${anything}".to_string()), &Bindings::new()).unwrap();
        assert_eq!(resolved, ConfigValue::String("${anything}".to_string()));
    }

    #[test]
    fn test_sub_interpolates_non_string_values() {
        let bindings = bindings_of(&[(
            "count",
            ConfigValue::Number(serde_yml::Number::from(3)),
        )]);
        let resolved =
            resolve_tree(&ConfigValue::Sub("replicas-${count}".to_string()), &bindings).unwrap();
        assert_eq!(resolved, ConfigValue::String("replicas-3".to_string()));
    }

    #[test]
    fn test_ref_returns_bound_value() {
        let bindings = bindings_of(&[("region", ConfigValue::String("eu-west-1".to_string()))]);
        let reference = ConfigValue::Ref {
            name: "region".to_string(),
            index: None,
        };
        assert_eq!(
            resolve_tree(&reference, &bindings).unwrap(),
            ConfigValue::String("eu-west-1".to_string())
        );
    }

    #[test]
    fn test_ref_unbound_name_fails() {
        let reference = ConfigValue::Ref {
            name: "missing".to_string(),
            index: None,
        };
        let err = resolve_tree(&reference, &Bindings::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ReferenceNotFound { name } if name == "missing"
        ));
    }

    #[test]
    fn test_indexed_ref_returns_element() {
        let zones = ConfigValue::Sequence(vec![
            ConfigValue::String("us-1".to_string()),
            ConfigValue::String("us-2".to_string()),
        ]);
        let bindings = bindings_of(&[("zones", zones)]);
        let reference = ConfigValue::Ref {
            name: "zones".to_string(),
            index: Some(1),
        };
        assert_eq!(
            resolve_tree(&reference, &bindings).unwrap(),
            ConfigValue::String("us-2".to_string())
        );
    }

    #[test]
    fn test_indexed_ref_on_non_sequence_is_type_mismatch() {
        let bindings = bindings_of(&[("zones", ConfigValue::String("us-1".to_string()))]);
        let reference = ConfigValue::Ref {
            name: "zones".to_string(),
            index: Some(0),
        };
        let err = resolve_tree(&reference, &bindings).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
    }

    #[test]
    fn test_indexed_ref_at_length_is_out_of_range() {
        let zones = ConfigValue::Sequence(vec![
            ConfigValue::String("us-1".to_string()),
            ConfigValue::String("us-2".to_string()),
        ]);
        let bindings = bindings_of(&[("zones", zones)]);

        // index == len - 1 succeeds
        let last = ConfigValue::Ref {
            name: "zones".to_string(),
            index: Some(1),
        };
        assert!(resolve_tree(&last, &bindings).is_ok());

        // index == len fails
        let past_end = ConfigValue::Ref {
            name: "zones".to_string(),
            index: Some(2),
        };
        let err = resolve_tree(&past_end, &bindings).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::IndexOutOfRange { index: 2, len: 2, .. }
        ));
    }

    #[test]
    fn test_ref_element_is_returned_unchanged() {
        // The indexed element is not re-substituted even if it looks like a template.
        let items = ConfigValue::Sequence(vec![ConfigValue::String("${env}".to_string())]);
        let bindings = bindings_of(&[
            ("items", items),
            ("env", ConfigValue::String("prod".to_string())),
        ]);
        let reference = ConfigValue::Ref {
            name: "items".to_string(),
            index: Some(0),
        };
        assert_eq!(
            resolve_tree(&reference, &bindings).unwrap(),
            ConfigValue::String("${env}".to_string())
        );
    }

    #[test]
    fn test_resolve_tree_rebuilds_containers() {
        let doc = parse_document(
            r#"
buckets:
  - name: !Sub "data-${env}"
    region: !Ref region
plain: untouched
"#,
        )
        .unwrap();

        let bindings = bindings_of(&[
            ("env", ConfigValue::String("dev".to_string())),
            ("region", ConfigValue::String("us-east-1".to_string())),
        ]);

        let resolved = resolve_tree(&doc, &bindings).unwrap();
        let bucket = &resolved.get("buckets").unwrap().as_sequence().unwrap()[0];
        assert_eq!(bucket.get("name").and_then(|v| v.as_str()), Some("data-dev"));
        assert_eq!(
            bucket.get("region").and_then(|v| v.as_str()),
            Some("us-east-1")
        );
        assert_eq!(resolved.get("plain").and_then(|v| v.as_str()), Some("untouched"));
    }

    #[test]
    fn test_bindings_insert_replaces_in_place() {
        let mut bindings = Bindings::new();
        bindings.insert("a", ConfigValue::String("1".to_string()));
        bindings.insert("b", ConfigValue::String("2".to_string()));
        bindings.insert("a", ConfigValue::String("3".to_string()));

        let names: Vec<&str> = bindings.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(
            bindings.get("a"),
            Some(&ConfigValue::String("3".to_string()))
        );
    }
}
