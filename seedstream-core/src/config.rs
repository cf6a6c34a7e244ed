//! Centralized configuration for the seeding engine.
//!
//! All tunable parameters live here so nothing is hard-coded at the call
//! sites that start seeds.

use std::time::Duration;

/// Standard piece size used when hashing uploaded content (256 KiB).
pub const DEFAULT_PIECE_SIZE: u32 = 262_144;

/// Configuration for the seeder actor and torrent metadata creation.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Piece size in bytes used when hashing new content
    pub piece_size: u32,
    /// Tracker URLs embedded into generated magnet links
    pub announce_urls: Vec<String>,
    /// Upper bound on a single seed-start, hashing included
    pub start_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            piece_size: DEFAULT_PIECE_SIZE,
            announce_urls: vec![
                "udp://tracker.opentrackr.org:1337/announce".to_string(),
                "udp://open.tracker.cl:1337/announce".to_string(),
            ],
            start_timeout: Duration::from_secs(300),
        }
    }
}
