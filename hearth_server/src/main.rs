//! Hearth message board server.
//!
//! ```bash
//! # Config lives in <data_dir>/hearth/config.json, created on first run
//! hearth
//!
//! # Keep everything in a throwaway directory
//! HEARTH_DATA_DIR=/tmp/hearth hearth
//!
//! # More logging
//! RUST_LOG=debug hearth
//! ```

use hearth_core::{config, HearthCore};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hearth_server=info,hearth_core=info,tower_http=debug".into()),
        )
        .init();

    let config = config::get_or_init().await?;
    let bind_addr = config.bind_addr.clone();

    let core = HearthCore::start(config).await?;
    let app = hearth_server::router(core);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Hearth running on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
