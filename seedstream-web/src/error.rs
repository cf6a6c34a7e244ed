//! API error taxonomy and HTTP error responses
//!
//! Every failure leaves the handler as an `ApiError`, which maps to a
//! status code, a machine-readable code, and a JSON body of the shape
//! `{"success": false, "error": "...", "code": "...", "details": "..."}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use seedstream_core::torrent::TorrentError;
use seedstream_db::StoreError;

use crate::intake::IntakeError;

/// Failures surfaced to API clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No video file provided")]
    NoFile,

    #[error("Unsupported file extension: {extension}")]
    InvalidExtension { extension: String },

    #[error("Unsupported content type: {content_type}")]
    InvalidContentType { content_type: String },

    #[error("File exceeds the maximum upload size")]
    FileTooLarge { max_bytes: u64 },

    #[error("Malformed upload request: {reason}")]
    MalformedRequest { reason: String },

    #[error("Video already exists: {video_id}")]
    DuplicateVideo { video_id: String },

    #[error("Video not found: {video_id}")]
    NotFound { video_id: String },

    #[error("Failed to start seeding: {reason}")]
    SeedingFailed { reason: String },

    #[error("Storage failure: {reason}")]
    StorageFailed { reason: String },
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoFile
            | Self::InvalidExtension { .. }
            | Self::InvalidContentType { .. }
            | Self::FileTooLarge { .. }
            | Self::MalformedRequest { .. } => StatusCode::BAD_REQUEST,
            Self::DuplicateVideo { .. } => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::SeedingFailed { .. } | Self::StorageFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code, so clients can branch on the cause
    /// without parsing the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoFile => "NO_FILE",
            Self::InvalidExtension { .. } => "INVALID_EXTENSION",
            Self::InvalidContentType { .. } => "INVALID_CONTENT_TYPE",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::MalformedRequest { .. } => "MALFORMED_REQUEST",
            Self::DuplicateVideo { .. } => "DUPLICATE_VIDEO",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::SeedingFailed { .. } => "SEEDING_FAILED",
            Self::StorageFailed { .. } => "STORAGE_FAILED",
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::FileTooLarge { max_bytes } => {
                Some(format!("maximum upload size is {max_bytes} bytes"))
            }
            Self::InvalidExtension { .. } => Some(format!(
                "allowed extensions: {}",
                crate::intake::ALLOWED_EXTENSIONS.join(", ")
            )),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }

        let body = ErrorBody {
            success: false,
            error: self.to_string(),
            code: self.code(),
            details: self.details(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::NoFile => Self::NoFile,
            IntakeError::InvalidExtension { extension } => Self::InvalidExtension { extension },
            IntakeError::InvalidContentType { content_type } => {
                Self::InvalidContentType { content_type }
            }
            IntakeError::TooLarge { max_bytes } => Self::FileTooLarge { max_bytes },
            IntakeError::Multipart(err) => Self::MalformedRequest {
                reason: err.to_string(),
            },
            IntakeError::Io(err) => Self::StorageFailed {
                reason: err.to_string(),
            },
        }
    }
}

impl From<TorrentError> for ApiError {
    fn from(err: TorrentError) -> Self {
        Self::SeedingFailed {
            reason: err.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { video_id } => Self::DuplicateVideo { video_id },
            StoreError::Database(err) => Self::StorageFailed {
                reason: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_error_classes() {
        assert_eq!(ApiError::NoFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::FileTooLarge { max_bytes: 1 }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::DuplicateVideo {
                video_id: "x".into()
            }
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::NotFound {
                video_id: "x".into()
            }
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::SeedingFailed { reason: "x".into() }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn too_large_is_distinguishable_from_other_rejections() {
        let too_large = ApiError::FileTooLarge {
            max_bytes: 524_288_000,
        };
        assert_eq!(too_large.code(), "FILE_TOO_LARGE");
        assert_ne!(
            too_large.code(),
            ApiError::InvalidExtension {
                extension: "txt".into()
            }
            .code()
        );
    }
}
