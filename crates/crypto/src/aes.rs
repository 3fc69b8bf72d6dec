//! AES-256-GCM response cipher.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;

use tollgate_core::{GateError, GateResult};

use crate::{ENVELOPE_CONTENT_TYPE, EncryptionEnvelope, ResponseCipher, ResponsePayload};

const ALG: &str = "A256GCM";
const NONCE_LEN: usize = 12;

/// Seals each payload under a fresh random nonce.
///
/// The declared content type is bound as associated data, so a client
/// cannot be tricked into interpreting the plaintext as something else.
#[derive(Clone)]
pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

impl AesGcmCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    pub fn seal(&self, payload: &ResponsePayload) -> GateResult<EncryptionEnvelope> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let aad = payload.content_type.as_deref().unwrap_or_default();
        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: &payload.body,
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|e| GateError::encryption(e.to_string()))?;

        Ok(EncryptionEnvelope {
            alg: ALG.to_string(),
            nonce: STANDARD.encode(nonce_bytes),
            ciphertext: STANDARD.encode(ciphertext),
            content_type: payload.content_type.clone(),
        })
    }

    /// Recover the plaintext payload from an envelope produced by [`Self::seal`].
    pub fn open(&self, envelope: &EncryptionEnvelope) -> GateResult<ResponsePayload> {
        if envelope.alg != ALG {
            return Err(GateError::encryption(format!("unsupported alg '{}'", envelope.alg)));
        }

        let nonce = STANDARD
            .decode(&envelope.nonce)
            .map_err(|e| GateError::encryption(format!("invalid nonce: {e}")))?;
        if nonce.len() != NONCE_LEN {
            return Err(GateError::encryption("invalid nonce length"));
        }
        let ciphertext = STANDARD
            .decode(&envelope.ciphertext)
            .map_err(|e| GateError::encryption(format!("invalid ciphertext: {e}")))?;

        let aad = envelope.content_type.as_deref().unwrap_or_default();
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &ciphertext,
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|e| GateError::encryption(e.to_string()))?;

        Ok(ResponsePayload::new(envelope.content_type.clone(), plaintext))
    }
}

impl ResponseCipher for AesGcmCipher {
    fn algorithm(&self) -> Option<&'static str> {
        Some(ALG)
    }

    fn encrypt(&self, payload: ResponsePayload) -> GateResult<ResponsePayload> {
        let envelope = self.seal(&payload)?;
        let body = serde_json::to_vec(&envelope).map_err(|e| GateError::encryption(e.to_string()))?;
        Ok(ResponsePayload::new(Some(ENVELOPE_CONTENT_TYPE.to_string()), body))
    }
}

/// Sends payloads unchanged (no key configured).
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl ResponseCipher for Passthrough {
    fn algorithm(&self) -> Option<&'static str> {
        None
    }

    fn encrypt(&self, payload: ResponsePayload) -> GateResult<ResponsePayload> {
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_payload(body: &'static str) -> ResponsePayload {
        ResponsePayload::new(Some("application/json".into()), body)
    }

    #[test]
    fn encrypt_produces_an_envelope_that_opens() {
        let cipher = AesGcmCipher::new(&[42; 32]);
        let sealed = cipher.encrypt(json_payload(r#"{"id":1}"#)).unwrap();

        assert_eq!(sealed.content_type.as_deref(), Some(ENVELOPE_CONTENT_TYPE));
        let envelope: EncryptionEnvelope = serde_json::from_slice(&sealed.body).unwrap();
        assert_eq!(envelope.alg, "A256GCM");
        assert_eq!(envelope.content_type.as_deref(), Some("application/json"));

        let opened = cipher.open(&envelope).unwrap();
        assert_eq!(opened, json_payload(r#"{"id":1}"#));
    }

    #[test]
    fn nonces_are_fresh_per_response() {
        let cipher = AesGcmCipher::new(&[1; 32]);
        let a = cipher.seal(&json_payload("same")).unwrap();
        let b = cipher.seal(&json_payload("same")).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn wrong_key_or_tampered_content_type_fails_to_open() {
        let envelope = AesGcmCipher::new(&[1; 32]).seal(&json_payload("secret")).unwrap();

        let err = AesGcmCipher::new(&[2; 32]).open(&envelope).unwrap_err();
        assert!(matches!(err, GateError::Encryption(_)));

        let mut relabelled = envelope.clone();
        relabelled.content_type = Some("text/html".into());
        assert!(AesGcmCipher::new(&[1; 32]).open(&relabelled).is_err());
    }

    #[test]
    fn malformed_envelopes_are_rejected() {
        let cipher = AesGcmCipher::new(&[1; 32]);
        let mut envelope = cipher.seal(&json_payload("x")).unwrap();
        envelope.nonce = STANDARD.encode([0u8; 4]);
        assert!(cipher.open(&envelope).is_err());

        envelope.alg = "none".into();
        assert!(cipher.open(&envelope).is_err());
    }

    #[test]
    fn passthrough_is_the_identity() {
        let payload = json_payload("plain");
        assert_eq!(Passthrough.encrypt(payload.clone()).unwrap(), payload);
        assert_eq!(Passthrough.algorithm(), None);
    }

    #[test]
    fn cipher_selection_follows_configuration() {
        let args = tollgate_core::EnvironmentArgs::new("s");
        assert_eq!(crate::cipher_from_args(&args).algorithm(), None);

        let args = args.with_encryption_key([9; 32]);
        assert_eq!(crate::cipher_from_args(&args).algorithm(), Some("A256GCM"));
    }
}
