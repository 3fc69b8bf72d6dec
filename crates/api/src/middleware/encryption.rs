use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{
        HeaderName, HeaderValue,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use tollgate_core::{GateError, GateResult};
use tollgate_crypto::{ResponseCipher, ResponsePayload};

use crate::app::errors::{ApiError, ClearText};

/// Names the algorithm an encrypted body was sealed with.
pub const ENCRYPTION_HEADER: HeaderName = HeaderName::from_static("x-response-encryption");

/// Request extension proving the encryption stage wraps the rest of the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ResponseSeal;

#[derive(Clone)]
pub struct InterceptorState {
    pub cipher: Arc<dyn ResponseCipher>,
}

/// Outermost pipeline stage: every response body a handler produces is passed
/// through the cipher before it is transmitted.
///
/// An encryption failure is fatal for the request and is not retried. The body
/// is buffered in full first, so nothing has been sent when that happens.
pub async fn encrypt_response(
    State(state): State<InterceptorState>,
    mut req: axum::http::Request<Body>,
    next: Next,
) -> Response {
    req.extensions_mut().insert(ResponseSeal);

    let response = next.run(req).await;
    if response.extensions().get::<ClearText>().is_some() {
        return response;
    }

    match seal(state.cipher.as_ref(), response).await {
        Ok(sealed) => sealed,
        Err(err) => ApiError(err).into_response(),
    }
}

async fn seal(cipher: &dyn ResponseCipher, response: Response) -> GateResult<Response> {
    let (mut parts, body) = response.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| GateError::encryption(format!("failed to buffer response body: {e}")))?;

    // Nothing to protect.
    if body.is_empty() {
        return Ok(Response::from_parts(parts, Body::empty()));
    }

    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    tracing::debug!(bytes = body.len(), "starting response encryption");
    let sealed = cipher.encrypt(ResponsePayload::new(content_type, body))?;
    tracing::debug!(bytes = sealed.body.len(), "response encryption completed");

    parts.headers.remove(CONTENT_LENGTH);
    match sealed.content_type {
        Some(ct) => {
            let value = HeaderValue::from_str(&ct)
                .map_err(|e| GateError::encryption(format!("invalid envelope content type: {e}")))?;
            parts.headers.insert(CONTENT_TYPE, value);
        }
        None => {
            parts.headers.remove(CONTENT_TYPE);
        }
    }
    if let Some(alg) = cipher.algorithm() {
        parts.headers.insert(ENCRYPTION_HEADER, HeaderValue::from_static(alg));
    }

    Ok(Response::from_parts(parts, Body::from(sealed.body)))
}
