//! Storage provider wiring.

use std::sync::Arc;

use async_trait::async_trait;

use tollgate_core::{EnvironmentArgs, GateResult, StorageProvider};

/// Provider used when no database is configured (dev/test).
#[derive(Debug, Default, Clone, Copy)]
pub struct InMemoryStorageProvider;

#[async_trait]
impl StorageProvider for InMemoryStorageProvider {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn preload(&self) -> GateResult<()> {
        Ok(())
    }

    async fn check(&self) -> GateResult<()> {
        Ok(())
    }
}

#[cfg(feature = "postgres")]
pub use postgres::PostgresStorageProvider;

#[cfg(feature = "postgres")]
mod postgres {
    use async_trait::async_trait;
    use sqlx::{PgPool, postgres::PgPoolOptions};

    use tollgate_core::{EnvironmentArgs, GateError, GateResult, StorageProvider};

    /// Postgres-backed provider; connections are opened lazily and warmed by `preload`.
    #[derive(Debug, Clone)]
    pub struct PostgresStorageProvider {
        pool: PgPool,
    }

    impl PostgresStorageProvider {
        pub fn connect_lazy(url: &str, args: &EnvironmentArgs) -> anyhow::Result<Self> {
            let pool = PgPoolOptions::new()
                .max_connections(args.database_max_connections)
                .connect_lazy(url)?;
            Ok(Self { pool })
        }

        async fn ping(&self) -> GateResult<()> {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map(|_| ())
                .map_err(|e| GateError::upstream(e.to_string()))
        }
    }

    #[async_trait]
    impl StorageProvider for PostgresStorageProvider {
        fn name(&self) -> &'static str {
            "postgres"
        }

        async fn preload(&self) -> GateResult<()> {
            self.ping().await
        }

        async fn check(&self) -> GateResult<()> {
            self.ping().await
        }
    }
}

/// Build the provider the configuration asks for.
pub fn storage_provider(args: &EnvironmentArgs) -> anyhow::Result<Arc<dyn StorageProvider>> {
    match &args.database_url {
        None => Ok(Arc::new(InMemoryStorageProvider)),
        Some(url) => {
            #[cfg(feature = "postgres")]
            {
                let provider = PostgresStorageProvider::connect_lazy(url, args)?;
                Ok(Arc::new(provider))
            }
            #[cfg(not(feature = "postgres"))]
            {
                let _ = url;
                tracing::warn!(
                    "DATABASE_URL set but postgres feature not enabled, falling back to in-memory"
                );
                Ok(Arc::new(InMemoryStorageProvider))
            }
        }
    }
}

/// Run the provider's preload off the startup path.
pub fn spawn_preload(storage: Arc<dyn StorageProvider>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match storage.preload().await {
            Ok(()) => tracing::info!(provider = storage.name(), "storage preload completed"),
            Err(e) => tracing::error!(provider = storage.name(), error = %e, "storage preload failed"),
        }
    })
}
