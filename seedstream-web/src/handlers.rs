//! HTTP handlers for the video API
//!
//! The upload handler runs the two-phase commit: store the file, start
//! seeding, then persist metadata. Each later phase compensates the
//! earlier ones on failure, so a failed upload leaves neither an orphan
//! file nor an orphan seed behind.

use std::path::PathBuf;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::Serialize;

use seedstream_core::{SeederHandle, SwarmStats};
use seedstream_db::{VideoRecord, VideoStore};

use crate::error::ApiError;
use crate::intake;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: VideoStore,
    pub seeder: SeederHandle,
    pub upload_root: PathBuf,
    pub max_upload_bytes: u64,
}

#[derive(Serialize)]
pub struct UploadResponse {
    success: bool,
    message: &'static str,
    data: UploadData,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadData {
    #[serde(flatten)]
    record: VideoRecord,
    info_hash: String,
}

#[derive(Serialize)]
pub struct ListResponse {
    success: bool,
    count: usize,
    data: Vec<VideoRecord>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    success: bool,
    data: SwarmStats,
}

#[derive(Serialize)]
pub struct MagnetResponse {
    success: bool,
    #[serde(rename = "magnetURI")]
    magnet_uri: String,
}

#[derive(Serialize)]
pub struct VideoResponse {
    success: bool,
    data: VideoRecord,
}

/// POST /api/videos/upload
///
/// Accepts a multipart video upload, seeds it, persists its metadata and
/// responds with the magnet link. The magnet link in the response is
/// already active: seeding starts before the response is sent.
pub async fn upload_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let upload =
        intake::receive_upload(multipart, &state.upload_root, state.max_upload_bytes).await?;

    let seed = match state.seeder.start_seeding(&upload.file_path).await {
        Ok(seed) => seed,
        Err(err) => {
            intake::discard(&upload).await;
            return Err(err.into());
        }
    };

    let record = VideoRecord {
        video_id: upload.video_id.clone(),
        filename: upload.filename,
        original_filename: upload.original_filename,
        file_path: upload.file_path.display().to_string(),
        file_size: upload.file_size as i64,
        mime_type: upload.mime_type,
        magnet_uri: seed.magnet_uri.clone(),
        uploaded_at: Utc::now(),
    };

    if let Err(err) = state.store.create(&record).await {
        // Roll back the earlier phases before reporting the failure.
        // Only a seed this request created is stopped; identical content
        // uploaded earlier keeps its session.
        if seed.newly_registered {
            if let Err(stop_err) = state.seeder.stop_seeding(seed.info_hash).await {
                tracing::warn!(
                    video_id = record.video_id,
                    error = %stop_err,
                    "failed to stop seeding while rolling back upload"
                );
            }
        }
        let stored = intake::StoredUpload {
            video_id: record.video_id.clone(),
            filename: record.filename.clone(),
            original_filename: record.original_filename.clone(),
            file_path: PathBuf::from(&record.file_path),
            file_size: record.file_size as u64,
            mime_type: record.mime_type.clone(),
        };
        intake::discard(&stored).await;
        return Err(err.into());
    }

    tracing::info!(
        video_id = record.video_id,
        info_hash = %seed.info_hash,
        file_size = record.file_size,
        "upload accepted and seeding"
    );

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            message: "Video uploaded and seeding started",
            data: UploadData {
                record,
                info_hash: seed.info_hash.to_hex(),
            },
        }),
    ))
}

/// GET /api/videos
pub async fn list_videos(State(state): State<AppState>) -> Result<Json<ListResponse>, ApiError> {
    let videos = state.store.find_all().await?;

    Ok(Json(ListResponse {
        success: true,
        count: videos.len(),
        data: videos,
    }))
}

/// GET /api/videos/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.seeder.stats().await?;

    Ok(Json(StatsResponse {
        success: true,
        data: stats,
    }))
}

/// GET /api/videos/{video_id}/magnet
pub async fn get_magnet(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<MagnetResponse>, ApiError> {
    let magnet_uri = state
        .store
        .find_magnet_uri(&video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            video_id: video_id.clone(),
        })?;

    Ok(Json(MagnetResponse {
        success: true,
        magnet_uri,
    }))
}

/// GET /api/videos/{video_id}
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<VideoResponse>, ApiError> {
    let record = state
        .store
        .find_by_id(&video_id)
        .await?
        .ok_or(ApiError::NotFound { video_id })?;

    Ok(Json(VideoResponse {
        success: true,
        data: record,
    }))
}
