use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::AppError;

#[derive(Debug)]
pub enum WebError {
    App(AppError),
    BadRequest(String),
}

impl From<AppError> for WebError {
    fn from(err: AppError) -> Self {
        WebError::App(err)
    }
}

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::MissingCredential | AppError::MissingImage | AppError::UnsupportedImage(_) => {
            StatusCode::BAD_REQUEST
        }
        AppError::InvalidCredential(_) => StatusCode::UNAUTHORIZED,
        AppError::InsufficientPermission(_) => StatusCode::FORBIDDEN,
        AppError::InsufficientQuota => StatusCode::PAYMENT_REQUIRED,
        AppError::UnknownAuthError(_) | AppError::UnknownError(_) => StatusCode::BAD_GATEWAY,
    }
}

/// JSON body shared by error responses and `error` stream events.
pub fn error_payload(err: &AppError) -> serde_json::Value {
    let mut payload = json!({
        "code": err.code(),
        "message": err.to_string(),
    });
    if let Some(detail) = err.detail() {
        payload["detail"] = json!(detail);
    }
    payload
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::App(err) => (status_for(&err), Json(error_payload(&err))).into_response(),
            WebError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "code": "bad_request", "message": message })),
            )
                .into_response(),
        }
    }
}
