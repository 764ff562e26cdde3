use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use tracing::{error, info, trace};

use super::serve::{load_state, run_server};
use crate::config::Settings;

pub async fn migrate_and_serve(settings: &Settings) -> Result<()> {
    trace!("Entering migrate_and_serve function");
    info!("Applying database migrations and starting server");

    let state = load_state(settings).await?;

    // Same connection as the server, so in-memory databases keep their schema
    info!("Running database migrations");
    if let Err(e) = Migrator::up(&state.db, None).await {
        error!("Failed to run database migrations: {}", e);
        return Err(e.into());
    }
    info!("Database migrations completed successfully");

    run_server(state, &settings.bind_address).await
}
