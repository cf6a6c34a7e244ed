//! Seeder actor: process-scoped gateway that tracks every active seed
//!
//! One actor task exclusively owns the info-hash to session map, so all
//! mutations are serialized through its command loop. Piece hashing runs
//! in the caller's task (see [`SeederHandle::start_seeding`]) which lets
//! concurrent uploads hash in parallel; only registration goes through
//! the actor.

pub mod actor;
pub mod commands;
pub mod handle;

use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;

pub use actor::spawn_seeder;
pub use handle::SeederHandle;

use crate::torrent::{InfoHash, TorrentMetadata};

/// Locator returned to callers once content is ready to be distributed.
#[derive(Debug, Clone)]
pub struct SeedInfo {
    /// Magnet URI for the seeded content
    pub magnet_uri: String,
    /// Hash of the bencoded info dictionary
    pub info_hash: InfoHash,
    /// False when identical content was already being seeded. Callers
    /// unwinding a failed request must not stop a session they did not
    /// create.
    pub newly_registered: bool,
}

/// Live state for a single seeded item, owned by the actor.
#[derive(Debug)]
pub(crate) struct SeedSession {
    pub name: String,
    pub file_path: PathBuf,
    pub magnet_uri: String,
    pub total_length: u64,
    pub connected_peers: usize,
    pub bytes_uploaded: u64,
    pub upload_speed_bps: u64,
    /// Fraction of the content available locally; the origin always has 1.0
    pub progress: f32,
    pub started_at: Instant,
}

impl SeedSession {
    pub(crate) fn new(metadata: &TorrentMetadata, file_path: PathBuf) -> Self {
        Self {
            name: metadata.name.clone(),
            file_path,
            magnet_uri: metadata.magnet_uri(),
            total_length: metadata.total_length,
            connected_peers: 0,
            bytes_uploaded: 0,
            upload_speed_bps: 0,
            progress: 1.0,
            started_at: Instant::now(),
        }
    }
}

/// Aggregate statistics over all active seeds.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmStats {
    /// Number of items currently seeded
    pub active_torrents: usize,
    /// Connected peers summed over all items
    pub total_peers: usize,
    /// Bytes uploaded summed over all items
    pub total_uploaded: u64,
    /// Aggregate upload rate in bytes per second
    pub upload_speed_bps: u64,
    /// Per-item breakdown
    pub torrents: Vec<SessionStats>,
}

/// Statistics for a single seeded item.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Content name
    pub name: String,
    /// 40-character hex info-hash
    pub info_hash: String,
    /// Content length in bytes
    pub size: u64,
    /// Seconds since this seed started
    pub uptime_secs: u64,
    /// Currently connected peers
    pub peers: usize,
    /// Bytes uploaded to peers
    pub uploaded: u64,
    /// Upload rate in bytes per second
    pub upload_speed_bps: u64,
    /// Fraction of content available locally (0.0 to 1.0)
    pub progress: f32,
}
