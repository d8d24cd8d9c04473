//! Crate-level error type.

use std::path::PathBuf;
use thiserror::Error;

/// Alias for `Result<T, EntityError>`.
pub type EntityResult<T> = Result<T, EntityError>;

/// Uniform error type used across the crate.
#[derive(Debug, Error)]
pub enum EntityError {
    // ── Encoding ─────────────────────────────────────────
    /// A local file could not be opened or read while building an upload.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("file reference must not be empty")]
    EmptyReference,
    #[error("invalid remote URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("multipart part has no field name")]
    MissingFieldName,
    #[error("conflicting parameter groups: {0} and {1}")]
    ConflictingGroups(&'static str, &'static str),
    #[error("field `{0}` holds a local file and can only be sent as multipart")]
    UploadRequiresMultipart(String),
    #[error("invalid MIME type `{0}`")]
    InvalidMimeType(String),
    #[error("failed to serialise `{field}`: {source}")]
    Serialize {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    // ── Decoding ─────────────────────────────────────────
    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    // ── Transport / API ──────────────────────────────────
    #[error("invalid bot configuration: {0}")]
    Config(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("Telegram API error {code}: {description}")]
    Api { code: i32, description: String },
}

impl EntityError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from the local filesystem.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display_names_path() {
        let err = EntityError::io(
            "/no/such/file",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.is_io());
        assert!(err.to_string().contains("/no/such/file"));
    }

    #[test]
    fn api_error_display() {
        let err = EntityError::Api {
            code: 400,
            description: "Bad Request: chat not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "Telegram API error 400: Bad Request: chat not found"
        );
        assert!(!err.is_io());
    }

    #[test]
    fn conflicting_groups_display() {
        let err = EntityError::ConflictingGroups("media", "location");
        assert!(err.to_string().contains("media and location"));
    }
}
