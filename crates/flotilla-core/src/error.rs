#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Notification settings error: {message}")]
    NotificationError { message: String },

    #[error("Config error: {0}")]
    Config(#[from] flotilla_config::ConfigError),
}

/// Result type alias for flotilla-core operations.
pub type CoreResult<T> = Result<T, CoreError>;
