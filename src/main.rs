use anyhow::Context;

mod app;
mod auth;
mod config;
mod health;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "identity_service=debug,axum=info,tower_http=info".to_string());
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

    let app_state = state::AppState::init().context("load configuration")?;
    tracing::info!(
        ttl_seconds = app_state.config.jwt.ttl_seconds,
        issuer = %app_state.config.jwt.issuer,
        "identity service configured"
    );

    let config = app_state.config.clone();
    app::serve(app::build_app(app_state), &config).await
}
