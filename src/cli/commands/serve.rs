use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, debug, trace, error};

use crate::config::{initialize_app_state, Settings};
use crate::router::create_router;
use crate::schemas::AppState;

pub async fn serve(settings: &Settings) -> Result<()> {
    trace!("Entering serve function");
    info!("Pizzeria application starting up");

    let state = load_state(settings).await?;
    run_server(state, &settings.bind_address).await
}

/// Connect to the database and build the shared handler state
pub(super) async fn load_state(settings: &Settings) -> Result<AppState> {
    debug!("Database URL: {}", settings.database_url);

    trace!("Initializing application state");
    match initialize_app_state(settings).await {
        Ok(state) => {
            debug!("Application state initialized successfully");
            Ok(state)
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            Err(e)
        }
    }
}

pub(super) async fn run_server(state: AppState, bind_address: &str) -> Result<()> {
    let app = create_router(state);
    debug!("Router created successfully");

    info!("Starting server on {}", bind_address);
    let listener = match TcpListener::bind(bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    info!("Pizzeria API server running on http://{}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
