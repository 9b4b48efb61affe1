use thiserror::Error;

/// Errors raised while reading or writing a cone ray angle asset.
#[derive(Debug, Error)]
pub enum AngleDataError {
    #[error("malformed cone ray angle asset: {0}")]
    Json(#[from] serde_json::Error),
}
