//! Torrent metadata creation from stored upload files
//!
//! Splits a file into pieces, hashes each with SHA-1 and derives the
//! info-hash from the bencoded info dictionary. This is the step that can
//! take a while for large uploads, so callers await it off the actor task.

use std::path::Path;

use sha1::{Digest, Sha1};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use super::{InfoHash, TorrentError, TorrentMetadata};

/// Creates single-file torrent metadata for uploaded content.
pub struct TorrentCreator {
    piece_size: u32,
}

impl TorrentCreator {
    /// Creates a torrent creator with the given piece size.
    pub fn new(piece_size: u32) -> Self {
        Self { piece_size }
    }

    /// Creates torrent metadata for the file at `file_path`.
    ///
    /// # Errors
    /// - `TorrentError::InvalidFile` - missing, empty, or unnamed file
    /// - `TorrentError::Io` - read failure while hashing
    pub async fn create_from_file(
        &self,
        file_path: &Path,
        announce_urls: Vec<String>,
    ) -> Result<TorrentMetadata, TorrentError> {
        if !file_path.exists() {
            return Err(TorrentError::InvalidFile {
                reason: format!("file does not exist: {}", file_path.display()),
            });
        }

        let mut file = File::open(file_path).await?;
        let total_length = file.metadata().await?.len();

        if total_length == 0 {
            return Err(TorrentError::InvalidFile {
                reason: "cannot seed an empty file".to_string(),
            });
        }

        let name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| TorrentError::InvalidFile {
                reason: format!("invalid file name: {}", file_path.display()),
            })?
            .to_string();

        let piece_hashes = self.hash_pieces(&mut file, total_length).await?;
        let info_hash = self.info_hash(&name, total_length, &piece_hashes);

        Ok(TorrentMetadata {
            info_hash,
            name,
            piece_length: self.piece_size,
            piece_hashes,
            total_length,
            announce_urls,
        })
    }

    /// Reads the file sequentially and hashes one piece at a time.
    async fn hash_pieces(
        &self,
        file: &mut File,
        total_length: u64,
    ) -> Result<Vec<[u8; 20]>, TorrentError> {
        let mut piece_hashes = Vec::new();
        let mut buffer = vec![0u8; self.piece_size as usize];
        let mut position = 0u64;

        while position < total_length {
            let remaining = total_length - position;
            let read_size = (remaining as usize).min(self.piece_size as usize);

            file.read_exact(&mut buffer[..read_size]).await?;

            let mut hasher = Sha1::new();
            hasher.update(&buffer[..read_size]);
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&hasher.finalize());
            piece_hashes.push(hash);

            position += read_size as u64;
        }

        Ok(piece_hashes)
    }

    /// Hashes the bencoded info dictionary.
    ///
    /// Keys are emitted in bencode's required lexicographic order:
    /// length, name, piece length, pieces.
    fn info_hash(&self, name: &str, length: u64, piece_hashes: &[[u8; 20]]) -> InfoHash {
        let mut info = Vec::with_capacity(128 + piece_hashes.len() * 20);

        info.push(b'd');
        bencode_str(&mut info, "length");
        bencode_int(&mut info, length);
        bencode_str(&mut info, "name");
        bencode_str(&mut info, name);
        bencode_str(&mut info, "piece length");
        bencode_int(&mut info, u64::from(self.piece_size));
        bencode_str(&mut info, "pieces");
        info.extend_from_slice((piece_hashes.len() * 20).to_string().as_bytes());
        info.push(b':');
        for hash in piece_hashes {
            info.extend_from_slice(hash);
        }
        info.push(b'e');

        let mut hasher = Sha1::new();
        hasher.update(&info);
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&hasher.finalize());
        InfoHash::new(hash)
    }
}

fn bencode_str(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(value.len().to_string().as_bytes());
    out.push(b':');
    out.extend_from_slice(value.as_bytes());
}

fn bencode_int(out: &mut Vec<u8>, value: u64) {
    out.push(b'i');
    out.extend_from_slice(value.to_string().as_bytes());
    out.push(b'e');
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[tokio::test]
    async fn create_from_small_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let data = b"seedstream test payload for torrent creation";
        temp_file.write_all(data).unwrap();

        let creator = TorrentCreator::new(32);
        let announce = vec!["udp://tracker.example.com:1337/announce".to_string()];
        let metadata = creator
            .create_from_file(temp_file.path(), announce.clone())
            .await
            .unwrap();

        assert_eq!(metadata.total_length, data.len() as u64);
        assert_eq!(metadata.piece_length, 32);
        assert_eq!(metadata.announce_urls, announce);
        assert!(!metadata.piece_hashes.is_empty());
    }

    #[tokio::test]
    async fn piece_count_matches_file_size() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(&vec![7u8; 1000]).unwrap();

        let creator = TorrentCreator::new(256);
        let metadata = creator
            .create_from_file(temp_file.path(), vec![])
            .await
            .unwrap();

        // 256 + 256 + 256 + 232
        assert_eq!(metadata.piece_hashes.len(), 4);
        assert_eq!(metadata.total_length, 1000);
    }

    #[tokio::test]
    async fn info_hash_is_deterministic() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"stable bytes, stable hash").unwrap();

        let creator = TorrentCreator::new(262_144);
        let first = creator
            .create_from_file(temp_file.path(), vec![])
            .await
            .unwrap();
        let second = creator
            .create_from_file(temp_file.path(), vec![])
            .await
            .unwrap();

        assert_eq!(first.info_hash, second.info_hash);
        assert_eq!(first.info_hash.to_hex().len(), 40);
    }

    #[tokio::test]
    async fn nonexistent_file_is_rejected() {
        let creator = TorrentCreator::new(262_144);
        let result = creator
            .create_from_file(Path::new("/nonexistent/clip.mp4"), vec![])
            .await;

        assert!(matches!(result, Err(TorrentError::InvalidFile { .. })));
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let temp_file = NamedTempFile::new().unwrap();

        let creator = TorrentCreator::new(262_144);
        let result = creator.create_from_file(temp_file.path(), vec![]).await;

        assert!(matches!(result, Err(TorrentError::InvalidFile { .. })));
    }

    #[tokio::test]
    async fn magnet_uri_uses_computed_hash() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"magnet source data").unwrap();

        let creator = TorrentCreator::new(262_144);
        let metadata = creator
            .create_from_file(temp_file.path(), vec![])
            .await
            .unwrap();

        let uri = metadata.magnet_uri();
        let expected_prefix = format!("magnet:?xt=urn:btih:{}", metadata.info_hash.to_hex());
        assert!(uri.starts_with(&expected_prefix));
    }
}
