//! Variant Gateway Library
//!
//! Serves objects from an origin store and keeps a compressed variant of each
//! image in a second, derived store. Variants are written eagerly on upload
//! when possible and otherwise materialized on first request.

pub mod config;
pub mod error;
pub mod gateway;
pub mod server;
pub mod types;
pub mod upload;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result, StartupError};
pub use gateway::ObjectGateway;
pub use server::{create_router, start_server, ServerState, SharedState};
pub use types::*;
