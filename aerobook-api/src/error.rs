use aerobook_core::CoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Core(err) => match err {
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::InvalidArgument(_) | CoreError::InvalidState(_) => StatusCode::BAD_REQUEST,
                CoreError::Conflict(_) => StatusCode::CONFLICT,
                CoreError::PaymentFailed(_) => StatusCode::PAYMENT_REQUIRED,
                CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
                CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal Server Error: {}", self);
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CoreError::NotFound("Flight not found".into()), StatusCode::NOT_FOUND),
            (CoreError::InvalidArgument("bad".into()), StatusCode::BAD_REQUEST),
            (CoreError::InvalidState("Booking is already cancelled".into()), StatusCode::BAD_REQUEST),
            (CoreError::Conflict("Only 3 seats available in economy class".into()), StatusCode::CONFLICT),
            (CoreError::PaymentFailed("Payment failed. Please try again.".into()), StatusCode::PAYMENT_REQUIRED),
            (CoreError::Forbidden("nope".into()), StatusCode::FORBIDDEN),
            (CoreError::Internal("db down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
        assert_eq!(AppError::Unauthorized("no token".into()).status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_internal_message_hidden() {
        let response = AppError::from(CoreError::Internal("password=hunter2".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal Server Error");
    }
}
