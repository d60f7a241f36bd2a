use crate::value::ConfigValue;

/// Top-level keys an account document is expected to carry.
const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["account", "include", "resources"];

/// Validation result containing all issues found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate an account document before resolution.
///
/// Errors mark documents that the include resolver would reject; warnings
/// mark configurations that resolve but are unlikely to deploy the way the
/// author intended. The document is never mutated.
pub fn validate(document: &ConfigValue) -> ValidationResult {
    let mut result = ValidationResult::default();

    let Some(entries) = document.as_mapping() else {
        result
            .errors
            .push("Account document must be a mapping".to_string());
        return result;
    };

    // Unknown top-level keys
    for (key, _) in entries {
        if !KNOWN_TOP_LEVEL_KEYS.contains(&key.as_str()) {
            result
                .warnings
                .push(format!("Unknown top-level key '{key}'"));
        }
    }

    // Account section
    match document.get("account") {
        None => {
            result
                .warnings
                .push("Missing 'account' section: no target account or region".to_string());
        }
        Some(account) => {
            validate_account_section(account, &mut result);
        }
    }

    // Include directives
    if let Some(include) = document.get("include") {
        match include.as_sequence() {
            None => {
                result
                    .errors
                    .push("'include' must be a sequence of directives".to_string());
            }
            Some(directives) => {
                for (i, directive) in directives.iter().enumerate() {
                    if directive.get("config").and_then(|v| v.as_str()).is_none() {
                        result.errors.push(format!(
                            "include[{i}]: directive requires a 'config' path"
                        ));
                    }
                }
            }
        }
    }

    // Tags in the account document itself are never substituted; only
    // included fragment resources go through the tag resolver.
    let mut tag_paths = Vec::new();
    collect_unresolved_tags(document, "", &mut tag_paths);
    for path in tag_paths {
        result.warnings.push(format!(
            "{path}: tag outside an included fragment is left unresolved"
        ));
    }

    result
}

fn validate_account_section(account: &ConfigValue, result: &mut ValidationResult) {
    if !account.is_mapping() {
        result
            .errors
            .push("'account' must be a mapping".to_string());
        return;
    }

    match account.get("aws_account") {
        None => {
            result
                .warnings
                .push("account.aws_account is not set".to_string());
        }
        Some(value) => {
            let id = value.scalar_string();
            let id_pattern = regex::Regex::new(r"^\d{12}$").expect("valid literal regex");
            if !id_pattern.is_match(&id) {
                result.warnings.push(format!(
                    "account.aws_account '{id}' is not a 12-digit account id"
                ));
            }
        }
    }

    match account.get("aws_region") {
        None => {
            result
                .warnings
                .push("account.aws_region is not set".to_string());
        }
        Some(value) => {
            if value.scalar_string().trim().is_empty() {
                result
                    .warnings
                    .push("account.aws_region is empty".to_string());
            }
        }
    }
}

/// Collect dotted paths of every `!Sub` / `!Ref` leaf in the document.
fn collect_unresolved_tags(value: &ConfigValue, path: &str, out: &mut Vec<String>) {
    match value {
        ConfigValue::Sub(_) | ConfigValue::Ref { .. } => {
            out.push(if path.is_empty() { "<root>" } else { path }.to_string());
        }
        ConfigValue::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_unresolved_tags(item, &format!("{path}[{i}]"), out);
            }
        }
        ConfigValue::Mapping(entries) => {
            for (key, value) in entries {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                collect_unresolved_tags(value, &child, out);
            }
        }
        _ => {}
    }
}
