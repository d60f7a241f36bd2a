use crate::loader::load_document;
use crate::resolve::{resolve_tree, Bindings};
use crate::value::ConfigValue;
use crate::ConfigError;
use std::path::Path;
use tracing::debug;

/// Expand all `include` directives in an account document, producing a
/// document whose `resources` mapping contains the merged, fully resolved
/// resource trees of every included fragment.
///
/// A document without an `include` key is returned unchanged. Directives
/// are processed strictly in declaration order; later includes merge on top
/// of earlier ones, and both merge on top of resources already present in
/// the document. The `include` key itself stays in the result.
///
/// Fragments are not expanded recursively: an `include` key inside a
/// fragment is carried into the merged output verbatim, never processed.
pub fn resolve_includes(
    document: &ConfigValue,
    base_dir: &Path,
) -> Result<ConfigValue, ConfigError> {
    let Some(include_list) = document.get("include") else {
        return Ok(document.clone());
    };

    let directives = parse_directives(include_list)?;

    // Start from the document's own resources; includes merge on top.
    let mut resources = document
        .get("resources")
        .cloned()
        .unwrap_or_else(|| ConfigValue::Mapping(Vec::new()));

    for directive in &directives {
        let fragment_path = base_dir.join(&directive.config);
        if !fragment_path.exists() {
            return Err(ConfigError::IncludedFileNotFound {
                path: fragment_path,
            });
        }

        debug!(path = %fragment_path.display(), "Resolving included fragment");

        let fragment = load_document(&fragment_path)?;
        let required = fragment_inputs(&fragment, &fragment_path)?;
        let Some(fragment_resources) = fragment.get("resources") else {
            return Err(ConfigError::MalformedFragment {
                path: fragment_path,
                message: "missing 'resources' section".to_string(),
            });
        };
        if !fragment_resources.is_mapping() {
            return Err(ConfigError::MalformedFragment {
                path: fragment_path,
                message: "'resources' must be a mapping".to_string(),
            });
        }

        let bindings = build_bindings(&directive.inputs, &fragment_path)?;

        let mut missing: Vec<String> = required
            .iter()
            .filter(|name| !bindings.contains(name.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(ConfigError::MissingInputs {
                path: fragment_path,
                missing,
            });
        }

        let resolved = resolve_tree(fragment_resources, &bindings)?;
        deep_merge(&mut resources, &resolved);
    }

    let mut result = document.clone();
    if let ConfigValue::Mapping(entries) = &mut result {
        match entries.iter_mut().find(|(key, _)| key == "resources") {
            Some((_, slot)) => *slot = resources,
            None => entries.push(("resources".to_string(), resources)),
        }
    }
    Ok(result)
}

/// Merge `source` into `target`, key by key.
///
/// Absent keys are inserted; two sequences concatenate with the target's
/// elements first; two mappings merge recursively; anything else is
/// overwritten by the source. Type mismatches are not an error; the
/// last-applied source wins for non-container values.
pub fn deep_merge(target: &mut ConfigValue, source: &ConfigValue) {
    match (target, source) {
        (ConfigValue::Sequence(target_items), ConfigValue::Sequence(source_items)) => {
            target_items.extend(source_items.iter().cloned());
        }
        (ConfigValue::Mapping(target_entries), ConfigValue::Mapping(source_entries)) => {
            for (key, value) in source_entries {
                match target_entries.iter_mut().find(|(k, _)| k == key) {
                    Some((_, existing)) => deep_merge(existing, value),
                    None => target_entries.push((key.clone(), value.clone())),
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

/// One entry of a document's `include` list.
struct IncludeDirective {
    /// Fragment path, relative to the including document's directory.
    config: String,
    /// Raw input entries, as parsed.
    inputs: Vec<ConfigValue>,
}

fn parse_directives(include_list: &ConfigValue) -> Result<Vec<IncludeDirective>, ConfigError> {
    let Some(entries) = include_list.as_sequence() else {
        return Err(ConfigError::MalformedDirective(
            "'include' must be a sequence of directives".to_string(),
        ));
    };

    entries
        .iter()
        .map(|entry| {
            if !entry.is_mapping() {
                return Err(ConfigError::MalformedDirective(
                    "include directive must be a mapping".to_string(),
                ));
            }
            let config = entry
                .get("config")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    ConfigError::MalformedDirective(
                        "include directive requires a 'config' path".to_string(),
                    )
                })?
                .to_string();
            let inputs = entry
                .get("inputs")
                .and_then(|v| v.as_sequence())
                .map(<[ConfigValue]>::to_vec)
                .unwrap_or_default();
            Ok(IncludeDirective { config, inputs })
        })
        .collect()
}

/// Read a fragment's declared required input names.
fn fragment_inputs(
    fragment: &ConfigValue,
    fragment_path: &Path,
) -> Result<Vec<String>, ConfigError> {
    let Some(inputs) = fragment.get("inputs") else {
        return Err(ConfigError::MalformedFragment {
            path: fragment_path.to_path_buf(),
            message: "missing 'inputs' section".to_string(),
        });
    };
    let Some(entries) = inputs.as_sequence() else {
        return Err(ConfigError::MalformedFragment {
            path: fragment_path.to_path_buf(),
            message: "'inputs' must be a sequence of names".to_string(),
        });
    };

    entries
        .iter()
        .map(|entry| {
            if entry.is_scalar() {
                Ok(entry.scalar_string())
            } else {
                Err(ConfigError::MalformedFragment {
                    path: fragment_path.to_path_buf(),
                    message: "'inputs' entries must be scalar names".to_string(),
                })
            }
        })
        .collect()
}

/// Build the variable bindings from one directive's input list.
///
/// A mapping entry contributes all of its key/value pairs; a bare scalar
/// binds its string form to null.
fn build_bindings(
    inputs: &[ConfigValue],
    fragment_path: &Path,
) -> Result<Bindings, ConfigError> {
    let mut bindings = Bindings::new();
    for entry in inputs {
        match entry {
            ConfigValue::Mapping(pairs) => {
                for (name, value) in pairs {
                    bindings.insert(name.clone(), value.clone());
                }
            }
            scalar if scalar.is_scalar() => {
                bindings.insert(scalar.scalar_string(), ConfigValue::Null);
            }
            other => {
                return Err(ConfigError::InvalidBinding {
                    path: fragment_path.to_path_buf(),
                    message: format!("input entry must be a name or a mapping, got: {other:?}"),
                });
            }
        }
    }
    Ok(bindings)
}
