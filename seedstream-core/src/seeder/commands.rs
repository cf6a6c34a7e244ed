//! Command definitions for the seeder actor.

use std::path::PathBuf;

use tokio::sync::oneshot;

use super::{SeedInfo, SwarmStats};
use crate::torrent::{InfoHash, TorrentMetadata};

/// Commands sent to the seeder actor.
///
/// Each command carries a response channel so callers can await the result.
/// Processing them one at a time on the actor task keeps the session map
/// free of locks: at most one insertion happens per info-hash, and stats
/// snapshots never observe a half-registered session.
pub enum SeederCommand {
    /// Register hashed content and start tracking it as an active seed.
    ///
    /// Registration is idempotent: re-registering a tracked info-hash
    /// returns the existing locator.
    RegisterSeed {
        metadata: TorrentMetadata,
        file_path: PathBuf,
        responder: oneshot::Sender<SeedInfo>,
    },
    /// Stop tracking a seed. Responds with whether it was tracked.
    StopSeeding {
        info_hash: InfoHash,
        responder: oneshot::Sender<bool>,
    },
    /// Snapshot aggregate statistics over all active seeds.
    GetStats {
        responder: oneshot::Sender<SwarmStats>,
    },
    /// Drop all sessions and stop the actor.
    Shutdown { responder: oneshot::Sender<()> },
}
