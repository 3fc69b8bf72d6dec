//! `tollgate-crypto` — response payload encryption.
//!
//! The HTTP layer hands every outgoing body to a [`ResponseCipher`] and sends
//! whatever comes back. Keys come from [`EnvironmentArgs`].

use std::sync::Arc;

use tollgate_core::EnvironmentArgs;

pub mod aes;
pub mod envelope;
pub mod payload;

pub use aes::{AesGcmCipher, Passthrough};
pub use envelope::{ENVELOPE_CONTENT_TYPE, EncryptionEnvelope};
pub use payload::{ResponseCipher, ResponsePayload};

/// Pick the cipher the configuration asks for.
pub fn cipher_from_args(args: &EnvironmentArgs) -> Arc<dyn ResponseCipher> {
    match &args.response_encryption_key {
        Some(key) => Arc::new(AesGcmCipher::new(key)),
        None => {
            tracing::warn!("RESPONSE_ENCRYPTION_KEY not set; responses are sent unencrypted");
            Arc::new(Passthrough)
        }
    }
}
