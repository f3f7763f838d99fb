use crate::flow::FlowError;
use crate::records::RecordError;
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use log::{error, warn};
use serde_json::json;

#[derive(Debug, Clone)]
pub struct ApiError {
    pub detail: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new ApiError with a detail message and status code
    pub fn new<S: ToString>(detail: S, status_code: StatusCode) -> Self {
        Self {
            detail: detail.to_string(),
            status_code,
        }
    }

    /// Create new Internal Server Error (500) with a detail message
    pub fn internal<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Create new Bad Request Error (400) with a detail message
    pub fn bad_request<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::BAD_REQUEST)
    }

    /// Create new Bad Gateway (502) with a detail message
    pub fn bad_gateway<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::BAD_GATEWAY)
    }

    /// Create new Service Unavailable (503) with a detail message
    pub fn service_unavailable<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::SERVICE_UNAVAILABLE)
    }
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::Store(RecordError::Store(e)) => {
                error!("Session store unavailable: {}", e);
                Self::service_unavailable("Session store unavailable")
            }
            FlowError::Store(e) => {
                error!("Session record error: {}", e);
                Self::internal("Session record error")
            }
            FlowError::Provider(e) => {
                error!("OAuth provider error: {}", e);
                Self::bad_gateway("OAuth provider error")
            }
            FlowError::InvalidCallback(reason) => {
                warn!("Rejected OAuth callback: {}", reason);
                Self::bad_request(format!("Invalid OAuth callback: {reason}"))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code;
        let body = json!({
            "detail": self.detail,
        });
        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::OAuthError;
    use crate::store::StoreError;

    #[test]
    fn test_flow_error_status_codes() {
        let cases = [
            (
                FlowError::Store(RecordError::Store(StoreError::Redis("down".to_string()))),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                FlowError::Provider(OAuthError::Config("bad".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                FlowError::InvalidCallback("state mismatch"),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status_code, expected);
        }
    }
}
