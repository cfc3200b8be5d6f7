use axum::{routing::get, Router};
use color_eyre::eyre::{eyre, WrapErr};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod ai;
mod api;
mod battle;
mod combat;
mod config;
mod data;
mod entity;
mod game_state;
mod grid;
mod item;
mod message;
mod scheduler;
mod skill;

use config::{GameConfig, CONFIG_PATH};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();

    // Load game configuration
    let config = match GameConfig::load(CONFIG_PATH) {
        Ok(cfg) => {
            info!("Loaded game config from {}", CONFIG_PATH);
            cfg
        }
        Err(e) => {
            warn!("Could not load {}: {}. Using defaults.", CONFIG_PATH, e);
            let default_config = GameConfig::default();
            if let Err(e) = default_config.save(CONFIG_PATH) {
                warn!("Could not write default {}: {}", CONFIG_PATH, e);
            }
            default_config
        }
    };
    let bind_address = config.server.bind_address.clone();

    let app = Router::new()
        .route("/", get(api::index))
        .route("/ws", get(api::websocket_handler))
        .route("/api/stages", get(api::stages_endpoint))
        .route("/api/skills", get(api::skills_endpoint))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(Arc::new(config));

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            error!("{} is already in use", bind_address);
            error!("Stop the existing server or change server.bind_address in {}", CONFIG_PATH);
            return Err(eyre!("address {} already in use", bind_address));
        }
        Err(e) => {
            return Err(e).wrap_err_with(|| format!("failed to bind {}", bind_address));
        }
    };
    info!("Server running on http://{}", bind_address);

    axum::serve(listener, app).await.wrap_err("server error")?;
    Ok(())
}
