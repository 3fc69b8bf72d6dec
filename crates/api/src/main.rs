use anyhow::Context;

use tollgate_api::{app, config::Environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;
    tollgate_observability::init(environment.log_format());

    let pipeline = app::start(&environment, app::routes::modules()).await?;

    let addr = environment.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, pipeline.into_router())
        .await
        .context("server terminated")
}
