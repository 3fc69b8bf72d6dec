//! Error translation: every failure leaves the process as `{"message": ...}`.

use std::any::Any;

use axum::http::StatusCode;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use tollgate_core::GateError;

/// Response extension marking a body the encryption stage must leave untouched.
///
/// Error bodies are sent in the clear. Only [`PipelineError`] responses carry it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ClearText;

/// Largest error body read back when rewriting a rejection.
const DETAIL_LIMIT: usize = 4 * 1024;

/// Status and client-facing message for one failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineError {
    #[serde(skip)]
    pub code: StatusCode,
    pub message: String,
}

impl PipelineError {
    fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Map a failure to its HTTP status and message. Total; never panics.
///
/// Server-side kinds get a generic message so no internals reach the client.
pub fn handle(err: &GateError) -> PipelineError {
    match err {
        GateError::Unauthenticated(msg) => PipelineError::new(StatusCode::UNAUTHORIZED, msg),
        GateError::Forbidden(msg) => PipelineError::new(StatusCode::FORBIDDEN, msg),
        GateError::BadRequest(msg) => PipelineError::new(StatusCode::BAD_REQUEST, msg),
        GateError::NotFound => PipelineError::new(StatusCode::NOT_FOUND, "not found"),
        GateError::UpstreamUnavailable(_) => {
            PipelineError::new(StatusCode::SERVICE_UNAVAILABLE, "service unavailable")
        }
        GateError::Encryption(_) | GateError::Unclassified(_) => {
            PipelineError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let mut response = (self.code, axum::Json(&self)).into_response();
        response.extensions_mut().insert(ClearText);
        response
    }
}

/// Handler-facing error: return `Result<_, ApiError>` and `?` away.
#[derive(Debug)]
pub struct ApiError(pub GateError);

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(GateError::Unclassified(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let translated = handle(&self.0);
        if self.0.is_server_fault() {
            tracing::error!(error = %self.0, status = translated.code.as_u16(), "request failed");
        } else {
            tracing::debug!(error = %self.0, status = translated.code.as_u16(), "request failed");
        }
        translated.into_response()
    }
}

/// Rewrite error responses that bypassed [`handle`] (extractor rejections,
/// method mismatches, bare status tuples) into `{"message"}` form.
///
/// Installed between the encryption stage and the gate. Headers other than
/// the body's content type and length survive (e.g. `Allow` on a 405).
pub async fn translate_response(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error())
        || response.extensions().get::<ClearText>().is_some()
    {
        return response;
    }

    let (parts, body) = response.into_parts();
    let plain_text = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/plain"));
    let detail = if plain_text {
        axum::body::to_bytes(body, DETAIL_LIMIT)
            .await
            .map(|b| String::from_utf8_lossy(&b).trim().to_string())
            .unwrap_or_default()
    } else {
        String::new()
    };

    let translated = rejection(status, detail);
    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), "untranslated server error response");
    } else {
        tracing::debug!(status = status.as_u16(), message = %translated.message, "request rejected by router");
    }

    let mut response = translated.into_response();
    for (name, value) in &parts.headers {
        if name != CONTENT_TYPE && name != CONTENT_LENGTH {
            response.headers_mut().append(name.clone(), value.clone());
        }
    }
    response
}

fn rejection(status: StatusCode, detail: String) -> PipelineError {
    let message = if detail.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request rejected")
            .to_ascii_lowercase()
    } else {
        detail
    };

    match status {
        StatusCode::BAD_REQUEST => handle(&GateError::BadRequest(message)),
        StatusCode::UNAUTHORIZED => handle(&GateError::Unauthenticated(message)),
        StatusCode::FORBIDDEN => handle(&GateError::Forbidden(message)),
        StatusCode::NOT_FOUND => handle(&GateError::NotFound),
        StatusCode::SERVICE_UNAVAILABLE => handle(&GateError::UpstreamUnavailable(message)),
        s if s.is_server_error() => handle(&GateError::unclassified(message)),
        s => PipelineError::new(s, message),
    }
}

/// Fallback for paths no router claims.
pub async fn not_found() -> ApiError {
    ApiError(GateError::NotFound)
}

/// Terminal stage for handlers that panic instead of returning an error.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };

    ApiError(GateError::unclassified(format!("handler panicked: {detail}"))).into_response()
}
