mod error;
mod api;
mod orders;
mod signals;
mod server;
mod bootstrap;
mod lifecycle;
mod logger;
mod middleware;
mod config;
mod reload;

use tracing::info;

use crate::{config::Settings, reload::ServerExit};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    dotenv::dotenv().ok();
    let settings = Settings::from_env()?;

    // Initialize tracing
    logger::init(settings.mode);

    info!(
        "Starting {} ({} mode, reload {})",
        config::SERVICE_NAME,
        settings.environment,
        if settings.reload_enabled() { "on" } else { "off" }
    );

    let state = bootstrap::initialize_app_state(settings.clone())?;

    // Create HTTP server
    let groups = server::route_groups(&state);
    let app = server::create_app(state, groups)?;
    let lifecycle = lifecycle::default_lifecycle(&settings);

    // Run the Server
    match server::run_server(app, &settings, &lifecycle).await? {
        ServerExit::Shutdown => {
            info!("👋 Server stopped");
            Ok(())
        }
        ServerExit::Reload(exe) => Err(reload::restart(&exe).into()),
    }
}
