//! Application-level errors raised during startup and configuration.

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Missing config with key \"{key}\"")]
    MissingConfig { key: String },

    #[error("Invalid value \"{value}\" for config key \"{key}\"")]
    InvalidConfig { key: String, value: String },

    #[error("Configuration error: {msg}")]
    ConfigurationError { msg: String },
}

impl AppError {
    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfig { key: key.into() }
    }

    pub fn invalid_config(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
        }
    }
}
