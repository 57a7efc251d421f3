use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum FileShareError {
    /// Missing paths and confinement violations both end up here so the
    /// response never reveals whether a path exists outside the root.
    #[error("Not found")]
    NotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("File not found")]
    AssetMissing,
}

impl IntoResponse for FileShareError {
    fn into_response(self) -> Response {
        match self {
            FileShareError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            FileShareError::Io(err) if err.kind() == std::io::ErrorKind::NotFound => {
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
            FileShareError::Io(err) => {
                error!("IO error while handling request: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
            FileShareError::Internal(msg) => {
                error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            FileShareError::AssetMissing => {
                (StatusCode::NOT_FOUND, "File not found").into_response()
            }
        }
    }
}
