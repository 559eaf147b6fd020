use thiserror::Error;

/// Main error type for aura operations
#[derive(Debug, Error)]
pub enum AuraError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuraError {
    /// Stable error code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            AuraError::Configuration(_) => "configuration",
            AuraError::Provider(_) => "provider",
            AuraError::Io(_) => "io_error",
            AuraError::TomlParse(_) => "configuration",
            AuraError::TomlSerialize(_) => "internal_error",
            AuraError::Internal(_) => "internal_error",
        }
    }

    /// Process exit code for the binary
    pub fn exit_code(&self) -> i32 {
        match self {
            AuraError::Configuration(_) => 2,
            AuraError::TomlParse(_) => 2,
            AuraError::Provider(_) => 3,
            AuraError::Io(_) => 5,
            _ => 1,
        }
    }
}

/// Errors from a content provider call
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("provider returned HTTP {code}")]
    Status { code: u16 },

    #[error("provider returned an empty response")]
    EmptyResponse,

    #[error("could not decode provider response: {0}")]
    Decode(String),
}
