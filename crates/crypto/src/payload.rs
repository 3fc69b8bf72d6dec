use bytes::Bytes;

use tollgate_core::GateResult;

/// What a handler asked to send: the body and its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePayload {
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl ResponsePayload {
    pub fn new(content_type: Option<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type,
            body: body.into(),
        }
    }
}

/// Transforms an outgoing payload into the shape that is actually transmitted.
///
/// Implementations are synchronous; the interceptor calls them once per
/// response after the body is fully buffered.
pub trait ResponseCipher: Send + Sync {
    /// Value of the `x-response-encryption` header, or `None` when payloads pass unchanged.
    fn algorithm(&self) -> Option<&'static str>;

    fn encrypt(&self, payload: ResponsePayload) -> GateResult<ResponsePayload>;
}
