//! Glyphd server binary

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glyphd::api::{create_router, AppState};
use glyphd::config::{AppConfig, LogFormat};
use glyphd::model::{weights, Classifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    init_tracing(&config)?;

    let instance = resolve_instance_name();
    tracing::info!(%instance, "Starting glyphd");

    let classifier = Arc::new(build_classifier(&config)?);
    let state = AppState::new(classifier, instance);

    let router = create_router(state, &config.static_files.root);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    tracing::info!(%addr, "Listening for HTTP traffic");

    axum::serve(listener, router).await?;

    Ok(())
}

fn resolve_instance_name() -> String {
    std::env::var("GLYPHD_INSTANCE")
        .ok()
        .or_else(|| hostname::get().ok().and_then(|h| h.into_string().ok()))
        .unwrap_or_else(|| "glyphd".to_string())
}

/// Load the configured weights file, falling back to the placeholder
/// classifier when none is configured or the file does not exist. A file
/// that exists but fails to parse or validate aborts startup.
fn build_classifier(config: &AppConfig) -> anyhow::Result<Classifier> {
    let Some(path) = config.weights_path() else {
        tracing::warn!("No weights file configured; serving placeholder predictions");
        return Ok(Classifier::Placeholder);
    };

    if !path.exists() {
        tracing::warn!(
            path = %path.display(),
            "Weights file not found; serving placeholder predictions"
        );
        return Ok(Classifier::Placeholder);
    }

    let network = weights::load_network(&path)
        .with_context(|| format!("failed to load weights from {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        layers = network.num_layers(),
        "Model weights loaded"
    );

    Ok(Classifier::Trained(network))
}

fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.logging.level.clone()))
        .unwrap_or_else(|_| EnvFilter::new("glyphd=info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }

    Ok(())
}
