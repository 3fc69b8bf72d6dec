//! Configuration bundle shared by the pipeline's collaborators.

/// Opaque-to-the-pipeline settings handed unchanged to the storage provider,
/// the response cipher and the context resolver.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvironmentArgs {
    /// HS256 secret used to verify bearer tokens.
    pub jwt_secret: String,

    /// AES-256 key for response bodies. `None` disables encryption.
    pub response_encryption_key: Option<[u8; 32]>,

    /// Storage connection URL. `None` selects the in-memory provider.
    pub database_url: Option<String>,

    pub database_max_connections: u32,
}

impl EnvironmentArgs {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            response_encryption_key: None,
            database_url: None,
            database_max_connections: 5,
        }
    }

    pub fn with_encryption_key(mut self, key: [u8; 32]) -> Self {
        self.response_encryption_key = Some(key);
        self
    }
}

// Secrets never reach logs.
impl core::fmt::Debug for EnvironmentArgs {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EnvironmentArgs")
            .field("jwt_secret", &"<redacted>")
            .field(
                "response_encryption_key",
                &self.response_encryption_key.map(|_| "<redacted>"),
            )
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("database_max_connections", &self.database_max_connections)
            .finish()
    }
}
