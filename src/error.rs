use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::types::QueryResponse;

pub type Result<T> = std::result::Result<T, Error>;

pub const INCONSISTENT_ANNOTATION_VERSION: &str =
    "Please specify either both annotation VEP version and annotation VEP cache version, or neither";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Please specify a species")]
    MissingSpecies,

    #[error("{}", INCONSISTENT_ANNOTATION_VERSION)]
    InconsistentAnnotationVersion,

    #[error("{{sourceEntryId}} should contain '_'")]
    MalformedSourceEntryKey,

    #[error("malformed variant identifier: {0}")]
    MalformedIdentifier(String),

    #[error("{0}")]
    AnnotationMetadataNotFound(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("species not found: {0}")]
    SpeciesNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingSpecies
            | Error::InconsistentAnnotationVersion
            | Error::MalformedSourceEntryKey
            | Error::MalformedIdentifier(_)
            | Error::AnnotationMetadataNotFound(_)
            | Error::InvalidFilter(_)
            | Error::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Error::SpeciesNotFound(_) => StatusCode::NOT_FOUND,
            Error::Io(_) | Error::Json(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            tracing::debug!(error = %self, "rejected request");
        } else {
            tracing::error!(error = %self, "request failed");
        }
        let body = QueryResponse::<serde_json::Value>::from_error(self.to_string());
        (self.status_code(), axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_bad_requests() {
        for error in [
            Error::MissingSpecies,
            Error::InconsistentAnnotationVersion,
            Error::MalformedSourceEntryKey,
            Error::MalformedIdentifier("1:x:A".to_string()),
            Error::AnnotationMetadataNotFound("no metadata".to_string()),
            Error::InvalidFilter("maf".to_string()),
            Error::InvalidParameter("limit".to_string()),
        ] {
            assert_eq!(error.status_code(), StatusCode::BAD_REQUEST, "{error}");
        }
    }

    #[test]
    fn test_source_entry_message_mentions_separator() {
        assert_eq!(
            Error::MalformedSourceEntryKey.to_string(),
            "{sourceEntryId} should contain '_'"
        );
    }

    #[test]
    fn test_annotation_metadata_message_passes_through() {
        let err = Error::AnnotationMetadataNotFound("No annotation metadata for 92/89".to_string());
        assert_eq!(err.to_string(), "No annotation metadata for 92/89");
    }

    #[test]
    fn test_internal_errors_are_server_errors() {
        assert_eq!(
            Error::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(!Error::Internal("boom".to_string()).is_client_error());
    }
}
