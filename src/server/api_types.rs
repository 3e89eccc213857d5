//! Response envelope for errors.
//!
//! Successful annotation routes answer with the bare payload the annotation
//! tool expects. Failures use the envelope:
//! ```json
//! { "error": true, "context": {}, "data": { "message": "..." } }
//! ```

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

use crate::labeling::LabelingError;

#[derive(Debug, Serialize)]
pub struct ApiResponse<C: Serialize, T: Serialize> {
    pub error: bool,
    pub context: C,
    pub data: T,
}

#[derive(Debug, Default, Serialize)]
pub struct EmptyContext {}

#[derive(Debug, Serialize)]
pub struct ErrorData {
    pub message: String,
}

impl ApiResponse<EmptyContext, ErrorData> {
    pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
        (
            status,
            Json(ApiResponse {
                error: true,
                context: EmptyContext {},
                data: ErrorData {
                    message: message.into(),
                },
            }),
        )
            .into_response()
    }
}

/// Annotation output: one entry per token.
#[derive(Debug, Serialize)]
pub struct Probabilities<T: Serialize> {
    pub probabilities: Vec<T>,
}

impl<T: Serialize> Probabilities<T> {
    pub fn json(probabilities: Vec<T>) -> Json<Self> {
        Json(Self { probabilities })
    }
}

/// A failed request, rendered through the error envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// The named service has no backend configured.
    pub fn unavailable(service: &str) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("{} service is disabled", service),
        )
    }
}

/// JSON request body whose rejections answer through the error envelope.
///
/// Both unparseable bodies and bodies missing required fields are 400s.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<LabelingError> for ApiError {
    fn from(err: LabelingError) -> Self {
        use crate::backends::BackendError;

        let status = match &err {
            LabelingError::Document(_) | LabelingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LabelingError::SentenceNotFound(_) => StatusCode::NOT_FOUND,
            LabelingError::Backend(BackendError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            LabelingError::Backend(_) => StatusCode::BAD_GATEWAY,
            LabelingError::InvalidConfig(_)
            | LabelingError::Uncovered { .. }
            | LabelingError::OutOfRange { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if !err.is_input_error() {
            warn!("Request failed: {}", err);
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ApiResponse::error(self.status, self.message)
    }
}
