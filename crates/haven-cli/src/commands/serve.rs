use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use haven_ai::{DisabledLlm, LlmClient, OpenAiCompatClient};
use haven_api::ApiContext;
use haven_config::HavenConfig;

use crate::cli::root_commands::ServeArgs;
use crate::commands::shared::open_service;

/// Handle `haven serve`.
pub async fn handle(args: &ServeArgs, config: &HavenConfig) -> anyhow::Result<()> {
    let addr = match &args.bind {
        Some(bind) => bind
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid --bind address '{bind}'"))?,
        None => config.server.socket_addr()?,
    };

    let service = open_service(config).await?;
    let ctx = ApiContext::new(service, llm_client(config)).with_general(&config.general);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "haven listening");

    axum::serve(listener, haven_api::http::router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

fn llm_client(config: &HavenConfig) -> Arc<dyn LlmClient> {
    match OpenAiCompatClient::from_config(&config.llm) {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM provider configured");
            Arc::new(client)
        }
        Err(error) => {
            tracing::warn!(%error, "LLM provider not configured; summaries and reflections will fail");
            Arc::new(DisabledLlm)
        }
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
