//! Torrent metadata types shared across the engine

pub mod creation;

use std::fmt;

pub use creation::TorrentCreator;

/// SHA-1 hash identifying a unique torrent.
///
/// 20-byte SHA-1 hash of the bencoded info dictionary. Uniquely identifies
/// the content across the BitTorrent network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash([u8; 20]);

impl InfoHash {
    /// Creates InfoHash from a 20-byte SHA-1 hash.
    pub fn new(hash: [u8; 20]) -> Self {
        Self(hash)
    }

    /// Returns reference to the underlying 20-byte hash.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the 40-character lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Metadata for a single-file torrent generated from an uploaded file.
#[derive(Debug, Clone)]
pub struct TorrentMetadata {
    /// Hash of the bencoded info dictionary
    pub info_hash: InfoHash,
    /// Content name (the stored file name)
    pub name: String,
    /// Piece size in bytes
    pub piece_length: u32,
    /// SHA-1 hash per piece, in order
    pub piece_hashes: Vec<[u8; 20]>,
    /// Total content length in bytes
    pub total_length: u64,
    /// Tracker URLs to advertise in the magnet link
    pub announce_urls: Vec<String>,
}

impl TorrentMetadata {
    /// Builds the magnet URI for this content.
    ///
    /// Format: `magnet:?xt=urn:btih:<40-hex>&dn=<name>[&tr=<url>...]`.
    pub fn magnet_uri(&self) -> String {
        let mut uri = format!(
            "magnet:?xt=urn:btih:{}&dn={}",
            self.info_hash.to_hex(),
            urlencoding::encode(&self.name)
        );
        for tracker in &self.announce_urls {
            uri.push_str("&tr=");
            uri.push_str(&urlencoding::encode(tracker));
        }
        uri
    }
}

/// Errors that can occur while creating torrent metadata or talking to the
/// seeder actor.
#[derive(Debug, thiserror::Error)]
pub enum TorrentError {
    #[error("Invalid seed input: {reason}")]
    InvalidFile { reason: String },

    #[error("I/O error while hashing content: {0}")]
    Io(#[from] std::io::Error),

    #[error("Seed for {info_hash} is not tracked")]
    SessionNotFound { info_hash: InfoHash },

    #[error("Seeding engine has shut down")]
    EngineShutdown,

    #[error("Seed start timed out after {seconds}s")]
    StartTimeout { seconds: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_hash_hex_is_40_lowercase_chars() {
        let hash = InfoHash::new([0xAB; 20]);
        let hex = hash.to_hex();
        assert_eq!(hex.len(), 40);
        assert_eq!(hex, "ab".repeat(20));
        assert_eq!(hash.to_string(), hex);
    }

    #[test]
    fn magnet_uri_contains_hash_name_and_trackers() {
        let metadata = TorrentMetadata {
            info_hash: InfoHash::new([0x01; 20]),
            name: "original movie.mp4".to_string(),
            piece_length: 262_144,
            piece_hashes: vec![[0u8; 20]],
            total_length: 42,
            announce_urls: vec!["udp://tracker.example.com:1337/announce".to_string()],
        };

        let uri = metadata.magnet_uri();
        assert!(uri.starts_with("magnet:?xt=urn:btih:"));
        assert!(uri.contains(&"01".repeat(20)));
        // Display name and tracker are percent-encoded
        assert!(uri.contains("&dn=original%20movie.mp4"));
        assert!(uri.contains("&tr=udp%3A%2F%2Ftracker.example.com%3A1337%2Fannounce"));
    }
}
