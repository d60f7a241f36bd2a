use crate::value::ConfigValue;
use crate::ConfigError;
use serde_yml::value::TaggedValue;
use std::path::Path;

/// Load and parse one YAML document from a file.
///
/// Fails with [`ConfigError::FileNotFound`] if the path does not exist and
/// [`ConfigError::ParseError`] if the content is not well-formed. The two
/// custom tags are recognized during lowering: `!Sub` becomes a
/// [`ConfigValue::Sub`] leaf and `!Ref` a [`ConfigValue::Ref`] leaf.
pub fn load_document(path: &Path) -> Result<ConfigValue, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_document(&contents)
}

/// Parse one YAML document from a string.
pub fn parse_document(source: &str) -> Result<ConfigValue, ConfigError> {
    let value: serde_yml::Value =
        serde_yml::from_str(source).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    lower(value)
}

/// Lower a `serde_yml::Value` into the semantic document tree.
///
/// Tag recognition happens here, per document, instead of registering
/// handlers on shared parser state: `serde_yml` carries tags structurally
/// as `Value::Tagged` nodes.
fn lower(value: serde_yml::Value) -> Result<ConfigValue, ConfigError> {
    match value {
        serde_yml::Value::Null => Ok(ConfigValue::Null),
        serde_yml::Value::Bool(b) => Ok(ConfigValue::Bool(b)),
        serde_yml::Value::Number(n) => Ok(ConfigValue::Number(n)),
        serde_yml::Value::String(s) => Ok(ConfigValue::String(s)),
        serde_yml::Value::Sequence(items) => Ok(ConfigValue::Sequence(
            items.into_iter().map(lower).collect::<Result<_, _>>()?,
        )),
        serde_yml::Value::Mapping(mapping) => {
            let mut entries = Vec::with_capacity(mapping.len());
            for (key, value) in mapping {
                let serde_yml::Value::String(key) = key else {
                    return Err(ConfigError::ParseError(format!(
                        "mapping keys must be strings, got: {key:?}"
                    )));
                };
                entries.push((key, lower(value)?));
            }
            Ok(ConfigValue::Mapping(entries))
        }
        serde_yml::Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            if tag == "Sub" {
                Ok(ConfigValue::Sub(tag_scalar(&tag, value)?))
            } else if tag == "Ref" {
                let (name, index) = parse_ref_text(&tag_scalar(&tag, value)?);
                Ok(ConfigValue::Ref { name, index })
            } else {
                Err(ConfigError::ParseError(format!(
                    "unsupported YAML tag: {tag}"
                )))
            }
        }
    }
}

/// Extract the scalar payload of a tagged node as a string.
fn tag_scalar(
    tag: &serde_yml::value::Tag,
    value: serde_yml::Value,
) -> Result<String, ConfigError> {
    let lowered = lower(value)?;
    if lowered.is_scalar() {
        Ok(lowered.scalar_string())
    } else {
        Err(ConfigError::ParseError(format!(
            "{tag} must be applied to a scalar value"
        )))
    }
}

/// Split `name[index]` reference text. An index suffix that is not a valid
/// non-negative integer, or an empty name, makes the whole text the name.
fn parse_ref_text(text: &str) -> (String, Option<usize>) {
    if let Some(open) = text.find('[') {
        if open > 0 && text.ends_with(']') {
            let index_text = &text[open + 1..text.len() - 1];
            if let Ok(index) = index_text.parse::<usize>() {
                return (text[..open].to_string(), Some(index));
            }
        }
    }
    (text.to_string(), None)
}
