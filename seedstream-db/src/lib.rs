//! Seedstream DB - SQLite persistence for uploaded video metadata
//!
//! One row per accepted upload. The insert relies on the primary key to
//! reject duplicate video ids atomically, which is what lets the upload
//! path run without any application-level locking.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Persisted metadata for one uploaded video.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Server-generated upload identifier
    pub video_id: String,
    /// Name the file is stored under on disk
    pub filename: String,
    /// Name the client supplied
    pub original_filename: String,
    /// Absolute path of the stored file
    pub file_path: String,
    /// Size in bytes
    pub file_size: i64,
    /// Declared content type
    pub mime_type: String,
    /// Magnet link for the seeded content
    #[serde(rename = "magnetURI")]
    pub magnet_uri: String,
    /// When the upload completed
    pub uploaded_at: DateTime<Utc>,
}

/// Errors from the video store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Video {video_id} already exists")]
    Duplicate { video_id: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// SQLite-backed store for video metadata.
#[derive(Clone)]
pub struct VideoStore {
    pool: SqlitePool,
}

impl VideoStore {
    /// Opens (creating if missing) the database at `database_url` and
    /// returns a store over a connection pool.
    ///
    /// In-memory databases get a single-connection pool: each SQLite
    /// memory connection is its own database, so pooling more than one
    /// would scatter the tables.
    ///
    /// # Errors
    /// - `StoreError::Database` - malformed URL or connection failure
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(sqlx::Error::from)?
            .create_if_missing(true);

        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            5
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Creates the videos table if it does not exist yet.
    ///
    /// # Errors
    /// - `StoreError::Database` - DDL failure
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS videos (
                video_id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                original_filename TEXT NOT NULL,
                file_path TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                mime_type TEXT NOT NULL,
                magnet_uri TEXT NOT NULL,
                uploaded_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::debug!("videos schema ready");
        Ok(())
    }

    /// Inserts a new video record.
    ///
    /// # Errors
    /// - `StoreError::Duplicate` - a record with this video id exists
    /// - `StoreError::Database` - any other insert failure
    pub async fn create(&self, record: &VideoRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO videos
                (video_id, filename, original_filename, file_path,
                 file_size, mime_type, magnet_uri, uploaded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.video_id)
        .bind(&record.filename)
        .bind(&record.original_filename)
        .bind(&record.file_path)
        .bind(record.file_size)
        .bind(&record.mime_type)
        .bind(&record.magnet_uri)
        .bind(record.uploaded_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Duplicate {
                    video_id: record.video_id.clone(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Lists all videos, newest upload first.
    ///
    /// # Errors
    /// - `StoreError::Database` - query failure
    pub async fn find_all(&self) -> Result<Vec<VideoRecord>, StoreError> {
        let records = sqlx::query_as::<_, VideoRecord>(
            "SELECT * FROM videos ORDER BY uploaded_at DESC, video_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Looks up a single video by id.
    ///
    /// # Errors
    /// - `StoreError::Database` - query failure
    pub async fn find_by_id(&self, video_id: &str) -> Result<Option<VideoRecord>, StoreError> {
        let record = sqlx::query_as::<_, VideoRecord>("SELECT * FROM videos WHERE video_id = ?")
            .bind(video_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Fetches just the magnet link for a video, if it exists.
    ///
    /// # Errors
    /// - `StoreError::Database` - query failure
    pub async fn find_magnet_uri(&self, video_id: &str) -> Result<Option<String>, StoreError> {
        let magnet_uri: Option<(String,)> =
            sqlx::query_as("SELECT magnet_uri FROM videos WHERE video_id = ?")
                .bind(video_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(magnet_uri.map(|(uri,)| uri))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    async fn memory_store() -> VideoStore {
        let store = VideoStore::connect("sqlite::memory:").await.unwrap();
        store.init_schema().await.unwrap();
        store
    }

    fn sample_record(video_id: &str, uploaded_at: DateTime<Utc>) -> VideoRecord {
        VideoRecord {
            video_id: video_id.to_string(),
            filename: format!("original_{video_id}.mp4"),
            original_filename: "holiday clip.mp4".to_string(),
            file_path: format!("/data/uploads/videos/{video_id}/original.mp4"),
            file_size: 1_048_576,
            mime_type: "video/mp4".to_string(),
            magnet_uri: format!("magnet:?xt=urn:btih:{}", "ab".repeat(20)),
            uploaded_at,
        }
    }

    #[tokio::test]
    async fn create_and_find_round_trip() {
        let store = memory_store().await;
        let id = Uuid::new_v4().to_string();
        let record = sample_record(&id, Utc::now());

        store.create(&record).await.unwrap();

        let found = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.video_id, record.video_id);
        assert_eq!(found.original_filename, record.original_filename);
        assert_eq!(found.file_size, record.file_size);
        assert_eq!(found.magnet_uri, record.magnet_uri);
        assert_eq!(found.uploaded_at, record.uploaded_at);
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let store = memory_store().await;
        let record = sample_record("fixed-id", Utc::now());

        store.create(&record).await.unwrap();
        let result = store.create(&record).await;

        assert!(matches!(
            result,
            Err(StoreError::Duplicate { video_id }) if video_id == "fixed-id"
        ));
    }

    #[tokio::test]
    async fn find_all_returns_newest_first() {
        let store = memory_store().await;
        let older = Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2026, 1, 11, 9, 30, 0).unwrap();

        store.create(&sample_record("older", older)).await.unwrap();
        store.create(&sample_record("newer", newer)).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].video_id, "newer");
        assert_eq!(all[1].video_id, "older");
    }

    #[tokio::test]
    async fn magnet_projection_matches_record() {
        let store = memory_store().await;
        let record = sample_record("magnet-id", Utc::now());
        store.create(&record).await.unwrap();

        let uri = store.find_magnet_uri("magnet-id").await.unwrap().unwrap();
        assert_eq!(uri, record.magnet_uri);
    }

    #[tokio::test]
    async fn missing_id_yields_none() {
        let store = memory_store().await;

        assert!(store.find_by_id("absent").await.unwrap().is_none());
        assert!(store.find_magnet_uri("absent").await.unwrap().is_none());
    }

    #[test]
    fn record_serializes_with_api_field_names() {
        let record = sample_record(
            "serde-id",
            Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap(),
        );
        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("videoId").is_some());
        assert!(json.get("originalFilename").is_some());
        assert!(json.get("magnetURI").is_some());
        assert!(json.get("magnetUri").is_none());
    }
}
