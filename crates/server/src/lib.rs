//! Biomatch Server - HTTP REST API for perceptual fingerprint matching
//!
//! This crate provides an HTTP server that exposes the biomatch pipeline
//! via a REST API. It supports:
//!
//! - **Enrollment**: Fingerprint face and thumbprint images and persist records
//! - **Search**: Find the closest enrolled record for a query image
//! - **Record Management**: Fetch and delete enrolled records
//! - **Health & Metrics**: Liveness/readiness probes and Prometheus metrics
//!
//! # Features
//!
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: Environment variable and file-based configuration
//! - **Error Handling**: JSON error responses with stable error codes
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//! - `POST /api/v1/enroll` - Enroll a record from base64 images
//! - `POST /api/v1/search` - Search by query image
//! - `GET /api/v1/records/{id}` - Get record by ID
//! - `DELETE /api/v1/records/{id}` - Delete record

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
