//! Actor implementation for the seeder.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tokio::sync::mpsc;

use super::commands::SeederCommand;
use super::handle::SeederHandle;
use super::{SeedInfo, SeedSession, SessionStats, SwarmStats};
use crate::config::EngineConfig;
use crate::torrent::InfoHash;

/// Spawns the seeder actor and returns its handle.
///
/// The actor owns the session map and processes commands sequentially on
/// its own task. The handle can be cloned and shared across request
/// handlers.
pub fn spawn_seeder(config: EngineConfig) -> SeederHandle {
    let (sender, receiver) = mpsc::channel(100);

    tokio::spawn(async move {
        run_actor_loop(receiver).await;
    });

    SeederHandle::new(sender, config)
}

async fn run_actor_loop(mut receiver: mpsc::Receiver<SeederCommand>) {
    tracing::debug!("seeder actor started");

    let mut sessions: HashMap<InfoHash, SeedSession> = HashMap::new();

    while let Some(command) = receiver.recv().await {
        if !handle_command(&mut sessions, command) {
            break;
        }
    }

    tracing::debug!("seeder actor stopped");
}

/// Handles a single command. Returns false to shut the actor down.
fn handle_command(sessions: &mut HashMap<InfoHash, SeedSession>, command: SeederCommand) -> bool {
    match command {
        SeederCommand::RegisterSeed {
            metadata,
            file_path,
            responder,
        } => {
            let info_hash = metadata.info_hash;
            let (session, newly_registered) = match sessions.entry(info_hash) {
                Entry::Occupied(entry) => (entry.into_mut(), false),
                Entry::Vacant(entry) => {
                    tracing::info!(%info_hash, path = %file_path.display(), "seeding started");
                    (entry.insert(SeedSession::new(&metadata, file_path)), true)
                }
            };
            let _ = responder.send(SeedInfo {
                magnet_uri: session.magnet_uri.clone(),
                info_hash,
                newly_registered,
            });
        }
        SeederCommand::StopSeeding {
            info_hash,
            responder,
        } => {
            match sessions.remove(&info_hash) {
                Some(session) => {
                    tracing::info!(
                        %info_hash,
                        path = %session.file_path.display(),
                        "seeding stopped"
                    );
                    let _ = responder.send(true);
                }
                None => {
                    tracing::debug!(%info_hash, "stop requested for untracked seed");
                    let _ = responder.send(false);
                }
            }
        }
        SeederCommand::GetStats { responder } => {
            let _ = responder.send(snapshot_stats(sessions));
        }
        SeederCommand::Shutdown { responder } => {
            tracing::info!(active = sessions.len(), "seeder shutting down");
            sessions.clear();
            let _ = responder.send(());
            return false;
        }
    }

    true
}

fn snapshot_stats(sessions: &HashMap<InfoHash, SeedSession>) -> SwarmStats {
    let mut stats = SwarmStats {
        active_torrents: sessions.len(),
        ..SwarmStats::default()
    };

    for (info_hash, session) in sessions {
        stats.total_peers += session.connected_peers;
        stats.total_uploaded += session.bytes_uploaded;
        stats.upload_speed_bps += session.upload_speed_bps;
        stats.torrents.push(SessionStats {
            name: session.name.clone(),
            info_hash: info_hash.to_hex(),
            size: session.total_length,
            uptime_secs: session.started_at.elapsed().as_secs(),
            peers: session.connected_peers,
            uploaded: session.bytes_uploaded,
            upload_speed_bps: session.upload_speed_bps,
            progress: session.progress,
        });
    }

    stats
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::torrent::TorrentError;

    fn seed_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[tokio::test]
    async fn start_seeding_returns_magnet_and_info_hash() {
        let seeder = spawn_seeder(EngineConfig::default());
        let file = seed_file(b"first upload payload");

        let info = seeder.start_seeding(file.path()).await.unwrap();

        assert!(info.magnet_uri.starts_with("magnet:?xt=urn:btih:"));
        assert_eq!(info.info_hash.to_hex().len(), 40);
        assert!(
            info.info_hash
                .to_hex()
                .chars()
                .all(|c| c.is_ascii_hexdigit())
        );
    }

    #[tokio::test]
    async fn reseeding_same_content_is_idempotent() {
        let seeder = spawn_seeder(EngineConfig::default());
        let file = seed_file(b"same bytes twice");

        let first = seeder.start_seeding(file.path()).await.unwrap();
        let second = seeder.start_seeding(file.path()).await.unwrap();

        assert_eq!(first.info_hash, second.info_hash);
        assert_eq!(first.magnet_uri, second.magnet_uri);
        assert!(first.newly_registered);
        assert!(!second.newly_registered);

        let stats = seeder.stats().await.unwrap();
        assert_eq!(stats.active_torrents, 1);
    }

    #[tokio::test]
    async fn failed_duplicate_upload_keeps_shared_seed() {
        let seeder = spawn_seeder(EngineConfig::default());
        let file = seed_file(b"content uploaded twice");

        let first = seeder.start_seeding(file.path()).await.unwrap();
        let second = seeder.start_seeding(file.path()).await.unwrap();
        assert_eq!(first.info_hash, second.info_hash);

        // A request unwinding a failure stops only a seed it created,
        // so the first upload's session stays active
        if second.newly_registered {
            seeder.stop_seeding(second.info_hash).await.unwrap();
        }

        let stats = seeder.stats().await.unwrap();
        assert_eq!(stats.active_torrents, 1);
    }

    #[tokio::test]
    async fn stats_track_all_active_seeds() {
        let seeder = spawn_seeder(EngineConfig::default());
        let first = seed_file(b"content one");
        let second = seed_file(b"content two, different bytes");

        let first_info = seeder.start_seeding(first.path()).await.unwrap();
        seeder.start_seeding(second.path()).await.unwrap();

        let stats = seeder.stats().await.unwrap();
        assert_eq!(stats.active_torrents, 2);
        assert_eq!(stats.torrents.len(), 2);
        assert!(
            stats
                .torrents
                .iter()
                .any(|t| t.info_hash == first_info.info_hash.to_hex())
        );
        // Nobody has connected yet
        assert_eq!(stats.total_peers, 0);
        assert_eq!(stats.total_uploaded, 0);
    }

    #[tokio::test]
    async fn stop_seeding_is_idempotent() {
        let seeder = spawn_seeder(EngineConfig::default());
        let file = seed_file(b"stoppable content");

        let info = seeder.start_seeding(file.path()).await.unwrap();

        seeder.stop_seeding(info.info_hash).await.unwrap();
        // Second stop is a no-op, not an error
        seeder.stop_seeding(info.info_hash).await.unwrap();

        let stats = seeder.stats().await.unwrap();
        assert_eq!(stats.active_torrents, 0);
    }

    #[tokio::test]
    async fn missing_file_fails_before_registration() {
        let seeder = spawn_seeder(EngineConfig::default());

        let result = seeder
            .start_seeding(std::path::Path::new("/nonexistent/clip.mp4"))
            .await;

        assert!(matches!(result, Err(TorrentError::InvalidFile { .. })));
        let stats = seeder.stats().await.unwrap();
        assert_eq!(stats.active_torrents, 0);
    }

    #[tokio::test]
    async fn shutdown_rejects_later_commands() {
        let seeder = spawn_seeder(EngineConfig::default());
        let file = seed_file(b"short lived seed");

        seeder.start_seeding(file.path()).await.unwrap();
        seeder.shutdown().await.unwrap();

        let result = seeder.start_seeding(file.path()).await;
        assert!(matches!(result, Err(TorrentError::EngineShutdown)));
    }
}
