use std::sync::Arc;

use anyhow::Context;
use notes_api::{config, handlers::HandlerContext, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DB_SECRET_ARN, DB_SECRET_JSON, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting notes API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        tracing::warn!("LOCAL_JWT_SECRET is not set; every request will be treated as unauthenticated");
    }

    let ctx = Arc::new(HandlerContext::from_config(config)?);
    let app = server::router(ctx, config.security.jwt_secret.clone());

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Notes API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
