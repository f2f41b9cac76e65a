use std::time::Duration;

mod app;
mod auth;
mod config;
mod error;
mod foods;
mod generation;
mod plans;
mod state;
#[cfg(test)]
mod testsupport;
mod users;

use crate::state::AppState;
use crate::users::cache::spawn_sweeper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "nutriplan=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    spawn_sweeper(
        app_state.cache.clone(),
        Duration::from_secs(app_state.config.cache.sweep_secs),
    );

    let app = app::build_app(app_state);
    app::serve(app).await
}
