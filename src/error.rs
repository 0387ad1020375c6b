/// Error types for Tab Time Grouper
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrouperError {
    #[error("browser call failed: {0}")]
    Host(String),

    #[error("settings storage failed: {0}")]
    Storage(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<serde_json::Error> for GrouperError {
    fn from(e: serde_json::Error) -> Self {
        GrouperError::Serialization(e.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for GrouperError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        GrouperError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GrouperError>;
