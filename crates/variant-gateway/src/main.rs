//! Variant Gateway - original and compressed object storage service
//!
//! Stores uploaded files in an origin store and serves a compressed JPEG
//! variant of images from a second store, deriving it on first request when
//! it is missing.

use blob_store::{FsBlobStore, StoreId};
use image_deriver::JpegDeriver;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};
use variant_gateway::{
    start_server, GatewayConfig, ObjectGateway, ServerState, SharedState, StartupError,
};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Initialize logging
    let env_filter =
        EnvFilter::from_default_env().add_directive("variant_gateway=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting Variant Gateway...");

    let config = GatewayConfig::from_env();
    info!("Port: {}", config.port);
    info!("Origin store: {:?}", config.origin_dir);
    info!("Derived store: {:?}", config.derived_dir);
    info!("JPEG quality: {}", config.jpeg_quality);

    let origin = FsBlobStore::new(StoreId::Origin, config.origin_dir.clone());
    origin.init().await?;
    let derived = FsBlobStore::new(StoreId::Derived, config.derived_dir.clone());
    derived.init().await?;

    let gateway = ObjectGateway::new(
        Arc::new(origin),
        Arc::new(derived),
        Arc::new(JpegDeriver::new(config.jpeg_quality)),
    );

    let state: SharedState = Arc::new(ServerState::new(gateway, config.max_upload_bytes));

    // Start HTTP server (blocking)
    start_server(state, config.port).await?;

    Ok(())
}
