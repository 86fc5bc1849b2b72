use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rota_core::error::RotaError;

/// Private sentinel error type used to carry an explicit HTTP 400 through
/// the `anyhow::Error` chain.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    pub(crate) fn join(err: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            let body = serde_json::json!({ "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<RotaError>() {
            match e {
                RotaError::NotInitialized => StatusCode::BAD_REQUEST,
                RotaError::WorkerNotFound(_) | RotaError::ItemNotFound(_) => StatusCode::NOT_FOUND,
                RotaError::InvalidStatus(_)
                | RotaError::InvalidWorkerId(_)
                | RotaError::AmbiguousWorkerId(_)
                | RotaError::EmptyName => StatusCode::BAD_REQUEST,
                RotaError::EmptyPool => StatusCode::CONFLICT,
                RotaError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
                RotaError::Io(_) | RotaError::Yaml(_) | RotaError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
