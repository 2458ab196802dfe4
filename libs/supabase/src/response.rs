use reqwest::{header::InvalidHeaderValue, StatusCode};
use serde_json::Value;

use crate::SupabaseError;

pub type Response<T> = Result<T, SupabaseError>;

pub trait IntoResponse<T> {
    fn into_response(self, message: &str) -> Response<T>;
}

impl<T> IntoResponse<T> for Result<T, reqwest::Error> {
    fn into_response(self, message: &str) -> Response<T> {
        self.map_err(|e| SupabaseError::ReqwestError {
            source: e,
            message: message.to_string(),
        })
    }
}

impl<T> IntoResponse<T> for Result<T, serde_json::Error> {
    fn into_response(self, message: &str) -> Response<T> {
        self.map_err(|e| SupabaseError::SerdeJsonError {
            source: e,
            message: message.to_string(),
        })
    }
}

impl<T> IntoResponse<T> for Result<T, url::ParseError> {
    fn into_response(self, message: &str) -> Response<T> {
        self.map_err(|e| SupabaseError::UrlError {
            source: e,
            message: message.to_string(),
        })
    }
}

impl<T> IntoResponse<T> for Result<T, InvalidHeaderValue> {
    fn into_response(self, message: &str) -> Response<T> {
        self.map_err(|e| SupabaseError::HeaderError {
            source: e,
            message: message.to_string(),
        })
    }
}

/// Builds the error for a non-2xx reply.
///
/// PostgREST answers `{code, message, details, hint}`, GoTrue either
/// `{error, error_description}` or `{code, error_code, msg}`.
pub(crate) fn failed_status(status: StatusCode, body: &str) -> SupabaseError {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|value| value.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let message = field("message")
        .or_else(|| field("msg"))
        .or_else(|| field("error_description"))
        .or_else(|| field("error"))
        .unwrap_or_else(|| body.trim().to_string());
    let code = field("error_code").or_else(|| field("code"));

    SupabaseError::FailedStatusCode {
        status_code: status,
        code,
        message,
    }
}
