//! Taskhub Server Binary

use anyhow::{bail, Result};
use taskhub_server::{
    config::{load_config, validate_config},
    telemetry, Server,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = load_config()?;
    telemetry::init(&config.logging)?;

    if let Err(errors) = validate_config(&config) {
        for err in &errors {
            error!(error = %err, "Invalid configuration");
        }
        bail!("Configuration is invalid ({} problem(s))", errors.len());
    }

    info!("Starting taskhub server v{}", env!("CARGO_PKG_VERSION"));

    let server = Server::new(config).await?;
    server.run().await?;

    info!("Server shutdown complete");
    Ok(())
}
