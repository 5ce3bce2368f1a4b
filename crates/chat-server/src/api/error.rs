use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chat_protocol::ErrorResponse;
use std::time::Duration;

/// Handler error: an `anyhow::Error` plus the status it maps to.
///
/// Anything converted with `?` becomes a 500; client mistakes and timeouts go
/// through the named constructors.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    kind: &'static str,
    error: anyhow::Error,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_request",
            error: anyhow::anyhow!(message.into()),
        }
    }

    pub fn timeout(limit: Duration) -> Self {
        Self {
            status: StatusCode::GATEWAY_TIMEOUT,
            kind: "timeout",
            error: anyhow::anyhow!("reply generation exceeded {:?}", limit),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed: {:?}", self.error);
        } else {
            tracing::debug!("Request rejected: {}", self.error);
        }
        (
            self.status,
            Json(ErrorResponse::new(self.kind, self.error.to_string())),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "internal_error",
            error: err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::bad_request("empty").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::timeout(Duration::from_secs(3)).status(), StatusCode::GATEWAY_TIMEOUT);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(AppError::from(io).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
