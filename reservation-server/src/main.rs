use reservation_server::{BoxError, Config, Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // 1. .env and logging
    setup_environment()?;

    tracing::info!("Reservation server starting...");

    // 2. Configuration
    let config = Config::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;
    tracing::info!(
        environment = %config.environment,
        database = %config.database_path,
        port = config.http_port,
        "Configuration loaded"
    );

    // 3. Database, seed data and services
    let state = ServerState::initialize(&config).await?;

    // 4. HTTP server until Ctrl-C
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
