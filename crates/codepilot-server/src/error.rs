// HTTP error mapping
//
// Every failure leaves the API as `{error, detail?}` with the status of its
// error kind. Provider internals never appear beyond the detail string.

use std::time::Duration;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use codepilot_lib::{AIError, ErrorKind};

#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    /// Orchestration failure
    AI(AIError),
    /// The request body could not be decoded
    BadRequest(String),
    /// The client exhausted its request window
    RateLimited { retry_after: Duration },
}

impl From<AIError> for ApiError {
    fn from(err: AIError) -> Self {
        ApiError::AI(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AI(err) => StatusCode::from_u16(err.kind().status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Whole seconds until the client may retry, never zero
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            ApiError::RateLimited { retry_after } => {
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                Some(secs.max(1))
            }
            _ => None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::AI(err) => ErrorBody {
                error: err.headline(),
                detail: err.detail(),
            },
            ApiError::BadRequest(detail) => ErrorBody {
                error: "invalid request body".to_string(),
                detail: Some(detail.clone()),
            },
            ApiError::RateLimited { .. } => ErrorBody {
                error: format!(
                    "Rate limit exceeded, retry in {} seconds",
                    self.retry_after_secs().unwrap_or(1)
                ),
                detail: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::AI(err) if err.kind() == ErrorKind::Validation => {
                log::warn!("[server] rejected request: {}", err)
            }
            ApiError::AI(err) => log::warn!("[server] request failed ({}): {}", err.code().as_str(), err),
            ApiError::BadRequest(detail) => log::warn!("[server] malformed body: {}", detail),
            ApiError::RateLimited { .. } => {}
        }
        let mut response = (status, Json(self.body())).into_response();
        if let Some(secs) = self.retry_after_secs() {
            response.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
