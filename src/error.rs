use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    /// The paste does not exist, or exists but has expired.
    #[error("Not Found")]
    NotFound,
    #[error("invalid request body: {source}")]
    Validation {
        #[from]
        source: validator::ValidationErrors,
    },
    #[error("invalid request body: {source}")]
    Json {
        #[from]
        source: JsonRejection,
    },
    #[error("invalid x-test-now-ms header")]
    InvalidClockOverride,
    #[error("could not allocate a unique paste id after {attempts} attempts")]
    IdSpaceExhausted { attempts: usize },
    #[error("database error")]
    Database { source: sqlx::Error },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Json { source } => match source.status() {
                StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ApiError::InvalidClockOverride => StatusCode::BAD_REQUEST,
            ApiError::IdSpaceExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status();

        let detail = if status_code.is_server_error() {
            match &self {
                ApiError::Database { source } => error!("{self}: {source}"),
                _ => error!("{self}"),
            }
            "Internal Server Error".to_owned()
        } else {
            self.to_string()
        };

        (status_code, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            _ => ApiError::Database { source },
        }
    }
}
