use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(#[from] tiberius::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl Error {
    /// Text surfaced to the client, without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Error::Config(msg)
            | Error::Validation(msg)
            | Error::MalformedRequest(msg)
            | Error::Unauthorized(msg)
            | Error::Upstream(msg) => msg.clone(),
            Error::Database(err) => err.to_string(),
            Error::Io(err) => err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Config(_) | Error::Database(_) | Error::Io(_) | Error::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match &self {
            // Auth failures keep their own envelope; clients of the auth layer read `message`.
            Error::Unauthorized(msg) => json!({
                "success": false,
                "message": msg,
                "status": status.as_u16(),
            }),
            other => json!({ "error": other.message() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value as JsonValue;

    async fn body_of(err: Error) -> (StatusCode, JsonValue) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_maps_to_bad_request_with_plain_message() {
        let (status, body) =
            body_of(Error::Validation("Missing required field: Euser".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing required field: Euser" }));
    }

    #[tokio::test]
    async fn upstream_failure_keeps_raw_text() {
        let (status, body) = body_of(Error::Upstream("deadlock victim".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "deadlock victim");
    }

    #[tokio::test]
    async fn unauthorized_uses_auth_envelope() {
        let (status, body) = body_of(Error::Unauthorized("Invalid token".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({ "success": false, "message": "Invalid token", "status": 401 })
        );
    }
}
