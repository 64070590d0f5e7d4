use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    UsageError(String),

    #[error("IO error")]
    IOError(#[from] std::io::Error),

    #[error("Reqwest error")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Failed to parse json, error: `{0:?}`")]
    JsonError(#[from] serde_json::Error),

    #[error("Unsupported manifest format: `{0}`")]
    UnsupportedManifestFormat(String),

    #[error("Failed to evaluate manifest script: `{0}`")]
    ManifestScriptError(String),

    #[error("Failed to rotate configuration token: `{0}`")]
    TokenRotationError(String),

    #[error("Slack error: `{0:?}`")]
    SlackError(String),
}
