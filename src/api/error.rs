use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::DomainError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// HTTP face of [`DomainError`].
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::RetrievalUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::ComposerFailure(_) | DomainError::ExternalService(_) => {
                StatusCode::BAD_GATEWAY
            }
            DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DomainError::Configuration(_)
            | DomainError::ParseFailure(_)
            | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "request failed");
        } else {
            tracing::warn!(error = %self.0, status = status.as_u16(), "request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let status = |e: DomainError| ApiError::from(e).status();

        assert_eq!(status(DomainError::validation("k")), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(DomainError::retrieval_unavailable("down")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status(DomainError::composer("llm")), StatusCode::BAD_GATEWAY);
        assert_eq!(status(DomainError::timeout("llm")), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            status(DomainError::internal("bug")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
