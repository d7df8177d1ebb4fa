use std::sync::Arc;

use proximity_gate::api;
use proximity_gate::config::Config;
use proximity_gate::error::AppError;
use proximity_gate::observability::logging::init_logging;
use proximity_gate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    init_logging(config.log_format, &config.log_level);

    let app_state = AppState::new(&config)?;
    let policy = *app_state.confirmations.policy();
    let shared_state = Arc::new(app_state);

    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(
        http_port = config.http_port,
        nominal_radius_meters = policy.nominal_radius_meters(),
        max_radius_meters = policy.max_radius_meters(),
        store_timeout_ms = config.store_timeout.as_millis() as u64,
        "http server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
