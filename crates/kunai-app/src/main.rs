use std::sync::Arc;

use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use kunai_app::app::api::routes;
use kunai_app::config::ConfigHandler;
use kunai_app::storage_handler::StorageHandler;
use kunai_core::config::load_config;
use kunai_core::constants::SERVER_NAME;
use kunai_service::storage::MemoryStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting {SERVER_NAME} CalDAV server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    if config.users.is_empty() {
        tracing::warn!("No users configured; every authenticated request will be rejected");
    }
    let storage = Arc::new(MemoryStorage::from_settings(&config));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(StorageHandler { storage })
        .hoop(ConfigHandler::new(config.clone()))
        .push(routes(&config.dav)?);

    tracing::info!(
        origin = %config.server.origin(),
        prefix = %config.dav.normalized_prefix(),
        "Server listening on {bind_addr}"
    );

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
