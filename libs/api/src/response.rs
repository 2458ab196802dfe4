use admin::ManagerError;
use axum::{http::StatusCode, response::IntoResponse};
use tracing::{error, warn};

use crate::{page, ApiError};

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, message) = match self {
            ApiError::AuthError(message) => (StatusCode::FORBIDDEN, message),
            ApiError::ClientError(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, "Page not found".to_string())
            }
        };
        (status_code, page::error_page(status_code, &message)).into_response()
    }
}

pub type ApiResponse<T> = Result<T, ApiError>;

pub trait IntoApiResponse<T> {
    fn into_response(self, message: &str) -> ApiResponse<T>;
}

impl<T> IntoApiResponse<T> for Result<T, strum::ParseError> {
    fn into_response(self, message: &str) -> ApiResponse<T> {
        self.map_err(|e| {
            error!("{:?}", e);
            ApiError::ClientError(message.to_string())
        })
    }
}

/// Actions that do not fit the manager's state are dropped; the page is
/// simply drawn again.
pub(crate) fn settle(task: &str, result: Result<(), ManagerError>) {
    if let Err(e) = result {
        warn!(task, err = e.to_string());
    }
}
