//! Biomatch Server - HTTP REST API for perceptual fingerprint matching
//!
//! This binary serves the enrollment, search, and record management
//! endpoints over REST.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}
