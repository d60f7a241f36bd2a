use crate::includes::resolve_includes;
use crate::loader::load_document;
use crate::value::ConfigValue;
use crate::ConfigError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One account's fully resolved deployment configuration.
///
/// Records are rebuilt fresh on every aggregation pass and never mutated
/// afterwards; the stage-construction collaborator consumes each exactly
/// once.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Config name, taken from the file stem (e.g. `dev` for `dev.yml`).
    pub name: String,

    /// Path of the account document this record was built from.
    pub config_path: PathBuf,

    /// The complete document with all includes resolved and merged.
    pub full_config: ConfigValue,

    /// Target AWS account id from `account.aws_account`, if present.
    pub aws_account: Option<String>,

    /// Target AWS region from `account.aws_region`, if present.
    pub aws_region: Option<String>,
}

/// Load every account document in a configuration directory.
///
/// Scans `config_dir` (non-recursive) for `*.yml` / `*.yaml` files, visits
/// them in sorted filename order, and resolves each document's includes
/// relative to the directory containing it. Any failure aborts the whole
/// aggregation: a malformed config must never silently deploy a subset.
pub fn load_account_configs(config_dir: &Path) -> Result<Vec<AccountConfig>, ConfigError> {
    let entries = std::fs::read_dir(config_dir).map_err(|e| ConfigError::FileRead {
        path: config_dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| is_account_document(path))
        .collect();
    paths.sort();

    let mut accounts = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();

        debug!(name = %name, path = %path.display(), "Loading account config");

        let document = load_document(&path)?;
        let base_dir = path.parent().unwrap_or(config_dir);
        let full_config = resolve_includes(&document, base_dir)?;

        accounts.push(AccountConfig {
            name,
            aws_account: account_field(&full_config, "aws_account"),
            aws_region: account_field(&full_config, "aws_region"),
            config_path: path,
            full_config,
        });
    }

    info!(count = accounts.len(), "Loaded account configurations");
    Ok(accounts)
}

fn is_account_document(path: &Path) -> bool {
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "yaml" || e == "yml");
    is_yaml && path.is_file()
}

/// Read an optional scalar field from the document's `account` section.
/// Numeric scalars are stringified; nulls and containers read as absent.
fn account_field(document: &ConfigValue, field: &str) -> Option<String> {
    let value = document.get("account")?.get(field)?;
    if value.is_null() || !value.is_scalar() {
        None
    } else {
        Some(value.scalar_string())
    }
}
