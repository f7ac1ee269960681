/*!
 * uniqset Service - Main Entry Point
 *
 * Small control service that provides:
 * - One shared deduplicated integer set
 * - Endpoint A: insert a value, list members
 * - Endpoint B: remove a value, list members
 */

use std::error::Error;
use std::sync::Arc;
use tracing::info;

use uniqset::{init_tracing, Config, ControlServer, ValueSet};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize structured tracing
    init_tracing();

    info!("uniqset service starting...");
    info!("================================================");

    let config = Config::from_env();
    info!(
        runtime_dir = %config.runtime_dir.display(),
        insert_endpoint = %config.insert_endpoint,
        remove_endpoint = %config.remove_endpoint,
        capacity = config.capacity,
        "Configuration loaded"
    );

    info!("Initializing value set...");
    let set = Arc::new(ValueSet::with_capacity(config.capacity));

    info!("Registering control endpoints...");
    let server = ControlServer::bind(&config, Arc::clone(&set))?;

    let handle = server.spawn();
    info!("================================================");
    info!("Service is ready to receive control requests");
    info!("Press Ctrl+C to exit");

    tokio::signal::ctrl_c().await?;

    info!("Shutting down: unregistering endpoints...");
    handle.shutdown().await;

    let drained = set.drain();
    info!(drained, "Set drained; service stopped");

    Ok(())
}
