mod accounts;
mod includes;
mod loader;
mod resolve;
mod validation;
mod value;

pub use accounts::{load_account_configs, AccountConfig};
pub use includes::{deep_merge, resolve_includes};
pub use loader::{load_document, parse_document};
pub use resolve::{resolve_tree, Bindings};
pub use validation::{validate, ValidationResult};
pub use value::ConfigValue;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: std::path::PathBuf },

    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    ParseError(String),

    #[error("Included configuration file not found: {path}")]
    IncludedFileNotFound { path: std::path::PathBuf },

    #[error("Included configuration '{path}' is malformed: {message}")]
    MalformedFragment {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Malformed include directive: {0}")]
    MalformedDirective(String),

    #[error("Invalid input binding for '{path}': {message}")]
    InvalidBinding {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Missing required inputs for '{}': {}", .path.display(), .missing.join(", "))]
    MissingInputs {
        path: std::path::PathBuf,
        missing: Vec<String>,
    },

    #[error("Referenced variable '{name}' not found in inputs")]
    ReferenceNotFound { name: String },

    #[error("Cannot index into non-sequence value bound to '{name}'")]
    TypeMismatch { name: String },

    #[error("Index {index} is out of range for variable '{name}' (length {len})")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },
}
