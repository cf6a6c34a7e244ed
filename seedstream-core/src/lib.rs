//! Seedstream Core - seeding engine and torrent metadata creation
//!
//! Provides the building blocks the HTTP layer hands uploaded files to:
//! piece hashing and info-hash computation, magnet URI construction, and
//! the process-scoped seeder actor that tracks every active seed.

pub mod config;
pub mod seeder;
pub mod torrent;

// Re-export main types for convenient access
pub use config::EngineConfig;
pub use seeder::{SeedInfo, SeederHandle, SessionStats, SwarmStats, spawn_seeder};
pub use torrent::{InfoHash, TorrentError, TorrentMetadata};
