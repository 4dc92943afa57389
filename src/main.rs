use std::{fs, sync::Arc};

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use digit_gan_service::{AppConfig, LatentSampler, ModelRegistry, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Arc::new(AppConfig::from_env()?);
    tracing::info!(
        model = %config.generator_module_path.display(),
        "loading generator model"
    );

    let registry = Arc::new(ModelRegistry::initialize(config.as_ref())?);
    tracing::info!(generator = ?registry.metadata(), "generator model loaded");

    fs::create_dir_all(&config.static_dir)?;
    let sampler = Arc::new(LatentSampler::from_entropy());
    let router = build_router(config.clone(), registry, sampler);

    let listener = TcpListener::bind(config.listen_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, output_mode = ?config.output_mode, "digit generator ready");

    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,hyper=warn,axum::rejection=trace".into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
