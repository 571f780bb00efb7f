pub mod annotations;
pub mod builder;
pub mod types;

pub use annotations::*;
pub use builder::*;
pub use types::*;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read annotations from {path}: {source}")]
    AnnotationsUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
