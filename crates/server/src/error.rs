use crate::payments::GatewayError;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::error::ServiceError;
use log::{error, warn};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Gateway(String),
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::Service(ServiceError::Database(err))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(format!("Malformed upload: {}", err.body_text()))
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidSignature(reason) => {
                warn!("Rejected payment notification: {reason}");
                Self::BadRequest("Invalid signature".to_string())
            }
            GatewayError::InvalidPayload(reason) => Self::BadRequest(reason),
            GatewayError::NotConfigured => Self::Gateway("Payments are not configured".to_string()),
            other => {
                error!("Payment gateway error: {other}");
                Self::Gateway("The payment processor is unavailable".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut field = None;

        let (status, message) = match self {
            ApiError::Service(ServiceError::Forbidden(message)) => (StatusCode::FORBIDDEN, message),
            ApiError::Service(ServiceError::NotFound(message)) => (StatusCode::NOT_FOUND, message),
            ApiError::Service(ServiceError::Validation(err)) => {
                field = Some(err.field);
                (StatusCode::UNPROCESSABLE_ENTITY, err.message)
            }
            ApiError::Service(ServiceError::Conflict(message)) => (StatusCode::CONFLICT, message),
            ApiError::Service(ServiceError::Database(err)) => {
                error!("Database error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::Service(ServiceError::Io(err)) => {
                error!("File storage error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The file could not be stored or read".to_string(),
                )
            }
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Gateway(message) => (StatusCode::BAD_GATEWAY, message),
        };

        let mut body = json!({
            "message": message,
            "status": status.as_u16(),
        });
        if let Some(field) = field {
            body["field"] = json!(field);
        }

        (status, Json(json!({ "error": body }))).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_error_carries_field() {
        let (status, body) =
            render(ServiceError::validation("grade", "Grade cannot exceed 10 points").into()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["field"], "grade");
        assert_eq!(body["error"]["message"], "Grade cannot exceed 10 points");
        assert_eq!(body["error"]["status"], 422);
    }

    #[tokio::test]
    async fn test_database_error_is_generic() {
        let (status, body) = render(DbErr::Custom("secret detail".to_string()).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "A database error occurred");
        assert!(body["error"].get("field").is_none());
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases: [(ApiError, StatusCode); 6] = [
            (ServiceError::forbidden("no").into(), StatusCode::FORBIDDEN),
            (ServiceError::not_found("gone").into(), StatusCode::NOT_FOUND),
            (ServiceError::conflict("full").into(), StatusCode::CONFLICT),
            (ApiError::Unauthorized("who".into()), StatusCode::UNAUTHORIZED),
            (GatewayError::InvalidSignature("bad").into(), StatusCode::BAD_REQUEST),
            (GatewayError::NotConfigured.into(), StatusCode::BAD_GATEWAY),
        ];

        for (err, expected) in cases {
            let (status, _) = render(err).await;
            assert_eq!(status, expected);
        }
    }
}
