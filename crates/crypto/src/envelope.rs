use serde::{Deserialize, Serialize};

/// Content type of an encrypted response body.
pub const ENVELOPE_CONTENT_TYPE: &str = "application/vnd.tollgate.envelope+json";

/// The transmitted form of an encrypted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionEnvelope {
    pub alg: String,
    /// Base64 (standard alphabet) nonce.
    pub nonce: String,
    /// Base64 (standard alphabet) ciphertext including the auth tag.
    pub ciphertext: String,
    /// Content type the handler declared for the plaintext.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}
