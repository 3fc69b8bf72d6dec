//! Configuration loaded from environment variables.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use tollgate_core::EnvironmentArgs;
use tollgate_observability::LogFormat;

const DEV_JWT_SECRET: &str = "dev-secret";

/// Process configuration: the collaborator bundle plus server settings.
#[derive(Debug, Clone)]
pub struct Environment {
    args: Arc<EnvironmentArgs>,
    bind_addr: SocketAddr,
    log_format: LogFormat,
    dev_secret: bool,
}

impl Environment {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host: IpAddr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse()
            .context("BIND_ADDR must be a valid IP address")?;

        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let jwt_secret = lookup("JWT_SECRET").filter(|s| !s.is_empty());
        let dev_secret = jwt_secret.is_none();

        let response_encryption_key = lookup("RESPONSE_ENCRYPTION_KEY")
            .filter(|s| !s.is_empty())
            .map(|raw| parse_key(&raw))
            .transpose()?;

        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let log_format = lookup("LOG_FORMAT")
            .map(|raw| raw.parse::<LogFormat>())
            .transpose()
            .context("LOG_FORMAT is invalid")?
            .unwrap_or_default();

        let args = EnvironmentArgs {
            jwt_secret: jwt_secret.unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
            response_encryption_key,
            database_url,
            database_max_connections,
        };

        Ok(Self {
            args: Arc::new(args),
            bind_addr: SocketAddr::new(host, port),
            log_format,
            dev_secret,
        })
    }

    /// The bundle handed to storage, encryption and context collaborators.
    pub fn args(&self) -> Arc<EnvironmentArgs> {
        Arc::clone(&self.args)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Log the effective configuration. Called once tracing is initialized.
    pub fn report(&self) {
        if self.dev_secret {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
        }
        tracing::info!(
            bind_addr = %self.bind_addr,
            response_encryption = self.args.response_encryption_key.is_some(),
            database = self.args.database_url.is_some(),
            "configuration loaded"
        );
    }
}

fn parse_key(raw: &str) -> Result<[u8; 32]> {
    let bytes = STANDARD
        .decode(raw.trim())
        .context("RESPONSE_ENCRYPTION_KEY must be base64")?;
    let Ok(key) = <[u8; 32]>::try_from(bytes.as_slice()) else {
        bail!(
            "RESPONSE_ENCRYPTION_KEY must decode to 32 bytes, got {}",
            bytes.len()
        );
    };
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Environment> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let env = load(&[]).unwrap();
        assert_eq!(env.bind_addr(), "0.0.0.0:8080".parse().unwrap());
        assert_eq!(env.log_format(), LogFormat::Json);

        let args = env.args();
        assert_eq!(args.jwt_secret, DEV_JWT_SECRET);
        assert!(args.response_encryption_key.is_none());
        assert!(args.database_url.is_none());
        assert_eq!(args.database_max_connections, 5);
    }

    #[test]
    fn explicit_values() {
        let key = STANDARD.encode([3u8; 32]);
        let env = load(&[
            ("BIND_ADDR", "127.0.0.1"),
            ("PORT", "9000"),
            ("JWT_SECRET", "s3cret"),
            ("RESPONSE_ENCRYPTION_KEY", key.as_str()),
            ("DATABASE_URL", "postgres://localhost/app"),
            ("DATABASE_MAX_CONNECTIONS", "20"),
            ("LOG_FORMAT", "pretty"),
        ])
        .unwrap();

        assert_eq!(env.bind_addr(), "127.0.0.1:9000".parse().unwrap());
        assert_eq!(env.log_format(), LogFormat::Pretty);
        let args = env.args();
        assert_eq!(args.jwt_secret, "s3cret");
        assert_eq!(args.response_encryption_key, Some([3u8; 32]));
        assert_eq!(args.database_url.as_deref(), Some("postgres://localhost/app"));
        assert_eq!(args.database_max_connections, 20);
    }

    #[test]
    fn invalid_values_abort() {
        assert!(load(&[("PORT", "eighty")]).is_err());
        assert!(load(&[("LOG_FORMAT", "xml")]).is_err());
        assert!(load(&[("RESPONSE_ENCRYPTION_KEY", "not base64!")]).is_err());

        let short = STANDARD.encode([1u8; 16]);
        let err = load(&[("RESPONSE_ENCRYPTION_KEY", short.as_str())]).unwrap_err();
        assert!(err.to_string().contains("32 bytes"));
    }
}
