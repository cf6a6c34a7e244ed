//! Multipart upload intake
//!
//! Pulls the video file out of a multipart request, validates extension,
//! content type and size, and streams it to its own directory under the
//! upload root. Validation failures clean up after themselves so a
//! rejected request leaves no partial file behind.

use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// File extensions accepted for upload, lowercase.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mov", "mkv", "webm"];

/// Declared content types accepted for upload.
///
/// `application/octet-stream` is allowed because browsers and curl often
/// fall back to it for perfectly valid video files; the extension check
/// still applies.
const ALLOWED_CONTENT_TYPES: [&str; 6] = [
    "video/mp4",
    "video/x-msvideo",
    "video/quicktime",
    "video/x-matroska",
    "video/webm",
    "application/octet-stream",
];

const UPLOAD_FIELD: &str = "video";

/// A validated upload written to disk, not yet seeded or persisted.
#[derive(Debug)]
pub struct StoredUpload {
    pub video_id: String,
    /// Name the file is stored under, `original.<ext>`
    pub filename: String,
    pub original_filename: String,
    pub file_path: PathBuf,
    pub file_size: u64,
    pub mime_type: String,
}

/// Errors while receiving an upload.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("no video file in request")]
    NoFile,

    #[error("unsupported extension: {extension}")]
    InvalidExtension { extension: String },

    #[error("unsupported content type: {content_type}")]
    InvalidContentType { content_type: String },

    #[error("upload exceeds {max_bytes} bytes")]
    TooLarge { max_bytes: u64 },

    #[error("multipart decode failed: {0}")]
    Multipart(#[from] MultipartError),

    #[error("I/O error while storing upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Receives the `video` field of a multipart request and stores it under
/// `<upload_root>/<video_id>/original.<ext>`.
///
/// Fields with other names are drained and ignored. The size cap is
/// enforced while streaming, so an oversized body stops being read as
/// soon as it crosses the limit.
///
/// # Errors
/// - `IntakeError::NoFile` - no usable video field in the request
/// - `IntakeError::InvalidExtension` / `InvalidContentType` - rejected file
/// - `IntakeError::TooLarge` - size cap exceeded
/// - `IntakeError::Multipart` - malformed request body
/// - `IntakeError::Io` - failure writing to the upload root
pub async fn receive_upload(
    mut multipart: Multipart,
    upload_root: &Path,
    max_bytes: u64,
) -> Result<StoredUpload, IntakeError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .ok_or(IntakeError::NoFile)?
            .to_string();

        let extension = validate_extension(&original_filename)?;
        let mime_type = validate_content_type(field.content_type())?;

        let video_id = Uuid::new_v4().to_string();
        let upload_dir = upload_root.join(&video_id);
        fs::create_dir_all(&upload_dir).await?;

        let filename = format!("original.{extension}");
        let file_path = upload_dir.join(&filename);

        let file_size = match stream_to_file(&mut field, &file_path, max_bytes).await {
            Ok(size) => size,
            Err(err) => {
                let _ = fs::remove_dir_all(&upload_dir).await;
                return Err(err);
            }
        };

        if file_size == 0 {
            let _ = fs::remove_dir_all(&upload_dir).await;
            return Err(IntakeError::NoFile);
        }

        tracing::debug!(
            video_id,
            original_filename,
            file_size,
            "upload stored on disk"
        );

        return Ok(StoredUpload {
            video_id,
            filename,
            original_filename,
            file_path,
            file_size,
            mime_type,
        });
    }

    Err(IntakeError::NoFile)
}

/// Removes a stored upload and its directory. Failures are logged, not
/// propagated: the caller is already unwinding a failed upload.
pub async fn discard(upload: &StoredUpload) {
    let Some(upload_dir) = upload.file_path.parent() else {
        return;
    };
    if let Err(err) = fs::remove_dir_all(upload_dir).await {
        tracing::warn!(
            video_id = upload.video_id,
            error = %err,
            "failed to remove discarded upload"
        );
    }
}

async fn stream_to_file(
    field: &mut Field<'_>,
    file_path: &Path,
    max_bytes: u64,
) -> Result<u64, IntakeError> {
    let mut file = fs::File::create(file_path).await?;
    let mut file_size: u64 = 0;

    while let Some(chunk) = field.chunk().await? {
        file_size += chunk.len() as u64;
        if file_size > max_bytes {
            return Err(IntakeError::TooLarge { max_bytes });
        }
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok(file_size)
}

fn validate_extension(original_filename: &str) -> Result<String, IntakeError> {
    let extension = Path::new(original_filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(IntakeError::InvalidExtension { extension })
    }
}

fn validate_content_type(content_type: Option<&str>) -> Result<String, IntakeError> {
    // Missing content type gets the octet-stream fallback, same as the
    // generic type many clients send
    let content_type = content_type.unwrap_or("application/octet-stream");

    if ALLOWED_CONTENT_TYPES.contains(&content_type) {
        Ok(content_type.to_string())
    } else {
        Err(IntakeError::InvalidContentType {
            content_type: content_type.to_string(),
        })
    }
}
