use crate::model::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shortlink_core::ShortenerError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid JSON payload")]
    InvalidJson,
    #[error("URL parameter is required")]
    MissingUrl,
    #[error("Invalid URL format - must be a valid HTTP or HTTPS URL")]
    InvalidUrl,
    #[error("Short code not found")]
    ShortCodeNotFound,
    #[error("Not found")]
    RouteNotFound,
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidJson | AppError::MissingUrl | AppError::InvalidUrl => {
                StatusCode::BAD_REQUEST
            }
            AppError::ShortCodeNotFound | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::Shortener(ShortenerError::StoreUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Shortener(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client. Store internals stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Shortener(ShortenerError::StoreUnavailable(_)) => {
                "Service temporarily unavailable. Please try again later.".to_string()
            }
            AppError::Shortener(_) | AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors() {
        assert_eq!(AppError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MissingUrl.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidUrl.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::ShortCodeNotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_unavailable_is_503() {
        let err = AppError::from(ShortenerError::StoreUnavailable("refused".into()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            err.public_message(),
            "Service temporarily unavailable. Please try again later."
        );
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let err = AppError::from(ShortenerError::Unexpected(
            "invalid value for key 'url_mapping:code:X'".into(),
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::from(ShortenerError::CodeSpaceExhausted { attempts: 100 });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }
}
