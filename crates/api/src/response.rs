//! The JSON envelope every endpoint answers with.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// `{ success, data?, message?, error? }`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Machine-readable failure description.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// A successful envelope with its HTTP status.
pub struct ApiResponse<T> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with `data`.
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope {
                success: true,
                data: Some(data),
                message: None,
                error: None,
            },
        }
    }

    /// 201 with `data`.
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }
}

impl ApiResponse<()> {
    /// 200 with only a `message`.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope {
                success: true,
                data: None,
                message: Some(message.into()),
                error: None,
            },
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Builds a failure envelope.
pub fn failure(
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<serde_json::Value>,
) -> Response {
    let body: Envelope<()> = Envelope {
        success: false,
        data: None,
        message: None,
        error: Some(ErrorBody {
            code,
            message,
            details,
        }),
    };
    (status, Json(body)).into_response()
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

/// Wraps the bare 408 and 413 answers of the timeout and body limit layers
/// in the failure envelope.
pub async fn envelope_bare_errors(response: Response) -> Response {
    if is_json(&response) {
        return response;
    }
    match response.status() {
        StatusCode::REQUEST_TIMEOUT => failure(
            StatusCode::REQUEST_TIMEOUT,
            "REQUEST_TIMEOUT",
            "request timed out".to_string(),
            None,
        ),
        StatusCode::PAYLOAD_TOO_LARGE => failure(
            StatusCode::PAYLOAD_TOO_LARGE,
            "PAYLOAD_TOO_LARGE",
            "request body is too large".to_string(),
            None,
        ),
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn bare(status: StatusCode) -> Response {
        Response::builder()
            .status(status)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn bare_timeout_becomes_envelope() {
        let response = envelope_bare_errors(bare(StatusCode::REQUEST_TIMEOUT)).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "REQUEST_TIMEOUT");
    }

    #[tokio::test]
    async fn bare_payload_too_large_becomes_envelope() {
        let response = envelope_bare_errors(bare(StatusCode::PAYLOAD_TOO_LARGE)).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await["error"]["code"],
            "PAYLOAD_TOO_LARGE"
        );
    }

    #[tokio::test]
    async fn other_responses_pass_through() {
        let enveloped = failure(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "gone".to_string(),
            None,
        );
        let response = envelope_bare_errors(enveloped).await;
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");

        let response = envelope_bare_errors(bare(StatusCode::NO_CONTENT)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
