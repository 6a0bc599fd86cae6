use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Version {version} out of range: cannot derive {derivation}")]
    VersionOutOfRange {
        version: String,
        derivation: &'static str,
    },

    #[error("Conditional edge references unknown version: {0}")]
    UnknownVersion(String),

    #[error("Edge index {index} out of range for graph with {len} nodes")]
    EdgeOutOfRange { index: usize, len: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
