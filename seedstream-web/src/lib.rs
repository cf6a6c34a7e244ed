//! Seedstream Web - HTTP API for uploading and seeding videos
//!
//! Exposes the upload endpoint plus listing, stats, magnet and detail
//! lookups. Wiring order and shutdown behavior live in [`server`].

pub mod error;
pub mod handlers;
pub mod intake;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use server::{ServerConfig, build_router, reseed_existing, run_server};
