//! Handle for communicating with the seeder actor.

use std::path::Path;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use super::commands::SeederCommand;
use super::{SeedInfo, SwarmStats};
use crate::config::EngineConfig;
use crate::torrent::{InfoHash, TorrentCreator, TorrentError};

/// Handle for communicating with the seeder actor.
///
/// Cheap to clone; every request handler holds one. All operations fail
/// with `TorrentError::EngineShutdown` once the actor has stopped.
#[derive(Clone)]
pub struct SeederHandle {
    sender: mpsc::Sender<SeederCommand>,
    config: EngineConfig,
}

impl SeederHandle {
    /// Creates a new handle with the given command sender and engine config.
    pub fn new(sender: mpsc::Sender<SeederCommand>, config: EngineConfig) -> Self {
        Self { sender, config }
    }

    /// Starts seeding the file at `file_path`.
    ///
    /// Hashes the content in the calling task, then registers the seed
    /// with the actor. Resolves only once the content is fully hashed and
    /// tracked, so the returned locator is immediately distributable.
    /// Large files take a while to hash; the whole operation is bounded by
    /// the configured start timeout so an unresponsive engine cannot hang
    /// a request forever.
    ///
    /// # Errors
    /// - `TorrentError::InvalidFile` - path missing, empty, or unreadable
    /// - `TorrentError::StartTimeout` - hashing exceeded the configured bound
    /// - `TorrentError::EngineShutdown` - actor no longer running
    pub async fn start_seeding(&self, file_path: &Path) -> Result<SeedInfo, TorrentError> {
        let seconds = self.config.start_timeout.as_secs();
        timeout(self.config.start_timeout, self.hash_and_register(file_path))
            .await
            .map_err(|_| TorrentError::StartTimeout { seconds })?
    }

    async fn hash_and_register(&self, file_path: &Path) -> Result<SeedInfo, TorrentError> {
        let creator = TorrentCreator::new(self.config.piece_size);
        let metadata = creator
            .create_from_file(file_path, self.config.announce_urls.clone())
            .await?;

        let (responder, rx) = oneshot::channel();
        let cmd = SeederCommand::RegisterSeed {
            metadata,
            file_path: file_path.to_path_buf(),
            responder,
        };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| TorrentError::EngineShutdown)?;

        rx.await.map_err(|_| TorrentError::EngineShutdown)
    }

    /// Stops seeding a previously started item.
    ///
    /// Idempotent: stopping an untracked info-hash is a no-op.
    ///
    /// # Errors
    /// - `TorrentError::EngineShutdown` - actor no longer running
    pub async fn stop_seeding(&self, info_hash: InfoHash) -> Result<(), TorrentError> {
        let (responder, rx) = oneshot::channel();
        let cmd = SeederCommand::StopSeeding {
            info_hash,
            responder,
        };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| TorrentError::EngineShutdown)?;

        rx.await.map_err(|_| TorrentError::EngineShutdown)?;
        Ok(())
    }

    /// Snapshots aggregate statistics over all active seeds.
    ///
    /// # Errors
    /// - `TorrentError::EngineShutdown` - actor no longer running
    pub async fn stats(&self) -> Result<SwarmStats, TorrentError> {
        let (responder, rx) = oneshot::channel();
        let cmd = SeederCommand::GetStats { responder };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| TorrentError::EngineShutdown)?;

        rx.await.map_err(|_| TorrentError::EngineShutdown)
    }

    /// Shuts the actor down gracefully, dropping all sessions.
    ///
    /// Must be awaited before process exit so peers disconnect cleanly.
    /// Subsequent operations on any clone of this handle fail with
    /// `TorrentError::EngineShutdown`.
    ///
    /// # Errors
    /// - `TorrentError::EngineShutdown` - actor already stopped
    pub async fn shutdown(&self) -> Result<(), TorrentError> {
        let (responder, rx) = oneshot::channel();
        let cmd = SeederCommand::Shutdown { responder };

        self.sender
            .send(cmd)
            .await
            .map_err(|_| TorrentError::EngineShutdown)?;

        rx.await.map_err(|_| TorrentError::EngineShutdown)
    }

    /// Returns true while the actor is accepting commands.
    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }
}
