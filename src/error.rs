use thiserror::Error;

/// Top-level error type for the conftree library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("{reason}")]
    InvalidJson {
        reason: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Schema has to be defined to validate configuration.")]
    NoSchema,

    #[error("Configuration data has to be defined before change.")]
    NoConfig,

    #[error("{path}: {reason}")]
    InvalidData { path: String, reason: String },

    #[error("{0}")]
    InvalidSchema(String),

    #[error("Node \"{0}\" already exists.")]
    NodeDuplication(String),

    #[error("{reason}")]
    InvalidResource {
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("{0}")]
    InvalidStorage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn invalid_data(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_json(
        reason: impl Into<String>,
        source: Option<serde_json::Error>,
    ) -> Self {
        Self::InvalidJson {
            reason: reason.into(),
            source,
        }
    }
}
