use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod game;
mod room;
mod state;
mod web;

use crate::config::load_settings;
use crate::error::Result as AppResult;
use crate::room::RoomManagerHandle;
use crate::state::AppState;
use crate::web::run_server;

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=info,tower_http=debug", env!("CARGO_PKG_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_settings = load_settings()?;
    tracing::info!("Configuration loaded: {:?}", app_settings);

    let room_manager = RoomManagerHandle::spawn(
        app_settings.game.room_buffer_size,
        app_settings.game.clone(),
    );

    let app_state = AppState { room_manager };

    run_server(app_state, app_settings.server).await?;

    Ok(())
}
