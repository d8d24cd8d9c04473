//! File references for media fields.
//!
//! A media field accepts three kinds of source: a `file_id` already stored on
//! Telegram's servers, an HTTP(S) URL Telegram fetches itself, or a local file
//! that has to be uploaded. The kind is decided once, when the reference is
//! built, and [`FileReference::resolve`] turns it into the multipart part to
//! send.

use crate::error::{EntityError, EntityResult};
use crate::files;
use crate::multipart::FormPart;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Scheme marker for local files in the string form of a reference.
pub const LOCAL_FILE_SCHEME: &str = "file://";

/// Where the bytes of a media field come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// `file_id` issued by Telegram.
    Identifier(String),
    /// HTTP(S) URL, sent verbatim.
    RemoteUrl(String),
    /// File on this machine, uploaded as multipart.
    LocalPath(PathBuf),
}

/// Source of one media attachment plus an optional multipart field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    source: FileSource,
    name: Option<String>,
}

impl FileReference {
    /// Classify a raw string by prefix.
    ///
    /// `file://` → local path, `http://` / `https://` → remote URL, anything
    /// else → server-side identifier. URL syntax is not checked here; Telegram
    /// gets the string verbatim and decides.
    pub fn parse(raw: &str) -> EntityResult<Self> {
        if raw.is_empty() {
            return Err(EntityError::EmptyReference);
        }
        if let Some(path) = raw.strip_prefix(LOCAL_FILE_SCHEME) {
            return Self::local_path(path);
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Self::remote_url(raw);
        }
        Self::identifier(raw)
    }

    pub fn identifier(file_id: impl Into<String>) -> EntityResult<Self> {
        let file_id = file_id.into();
        if file_id.is_empty() {
            return Err(EntityError::EmptyReference);
        }
        Ok(Self::from_source(FileSource::Identifier(file_id)))
    }

    /// Remote URL, kept exactly as given.
    pub fn remote_url(url: impl Into<String>) -> EntityResult<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(EntityError::EmptyReference);
        }
        Ok(Self::from_source(FileSource::RemoteUrl(url)))
    }

    pub fn local_path(path: impl AsRef<Path>) -> EntityResult<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(EntityError::EmptyReference);
        }
        Ok(Self::from_source(FileSource::LocalPath(path.to_path_buf())))
    }

    fn from_source(source: FileSource) -> Self {
        Self { source, name: None }
    }

    /// Field name to use when the caller passes none to [`resolve`](Self::resolve).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_local(&self) -> bool {
        matches!(self.source, FileSource::LocalPath(_))
    }

    /// Text sent on the wire for identifiers and URLs. `None` for local files.
    pub fn as_remote_str(&self) -> Option<&str> {
        match &self.source {
            FileSource::Identifier(s) | FileSource::RemoteUrl(s) => Some(s),
            FileSource::LocalPath(_) => None,
        }
    }

    /// Check that a remote URL parses. Other sources always pass.
    ///
    /// Optional: encoding never calls this.
    pub fn validate_url(&self) -> EntityResult<()> {
        match &self.source {
            FileSource::RemoteUrl(raw) => url::Url::parse(raw).map(|_| ()).map_err(|source| {
                EntityError::InvalidUrl {
                    url: raw.clone(),
                    source,
                }
            }),
            FileSource::Identifier(_) | FileSource::LocalPath(_) => Ok(()),
        }
    }

    /// Build the multipart part for this reference.
    ///
    /// `override_name` wins when non-empty; otherwise the stored name is used.
    /// Local files are read in full and closed before this returns; an
    /// identifier or URL becomes a text part holding the raw string.
    pub fn resolve(&self, override_name: Option<&str>) -> EntityResult<FormPart> {
        let name = override_name
            .filter(|n| !n.is_empty())
            .or(self.name.as_deref())
            .filter(|n| !n.is_empty())
            .ok_or(EntityError::MissingFieldName)?
            .to_string();

        match &self.source {
            FileSource::LocalPath(path) => {
                let local = files::read_local_file(path)?;
                debug!("Attaching {} as `{}`", local.file_name, name);
                Ok(FormPart::File {
                    name,
                    file_name: local.file_name,
                    mime_type: local.mime_type,
                    data: local.data,
                })
            }
            FileSource::Identifier(value) | FileSource::RemoteUrl(value) => {
                Ok(FormPart::Text {
                    name,
                    value: value.clone(),
                })
            }
        }
    }
}

impl fmt::Display for FileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            FileSource::Identifier(s) | FileSource::RemoteUrl(s) => f.write_str(s),
            FileSource::LocalPath(p) => write!(f, "{}{}", LOCAL_FILE_SCHEME, p.display()),
        }
    }
}

impl FromStr for FileReference {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for FileReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FileReference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_classifies_sources() {
        let id = FileReference::parse("AgACAgIAAxkBAAIB").unwrap();
        assert_eq!(id.source(), &FileSource::Identifier("AgACAgIAAxkBAAIB".into()));

        let url = FileReference::parse("https://example.com/cat.jpg").unwrap();
        assert_eq!(
            url.source(),
            &FileSource::RemoteUrl("https://example.com/cat.jpg".into())
        );

        let local = FileReference::parse("file:///tmp/x.jpg").unwrap();
        assert_eq!(local.source(), &FileSource::LocalPath("/tmp/x.jpg".into()));
        assert!(local.is_local());
    }

    #[test]
    fn empty_reference_rejected() {
        assert!(matches!(
            FileReference::parse(""),
            Err(EntityError::EmptyReference)
        ));
        assert!(matches!(
            FileReference::parse("file://"),
            Err(EntityError::EmptyReference)
        ));
    }

    #[test]
    fn malformed_urls_still_classify_as_remote() {
        for raw in ["http://", "https://exa mple.com/a.jpg", "http://[::1"] {
            let r = FileReference::parse(raw).unwrap();
            assert_eq!(r.source(), &FileSource::RemoteUrl(raw.into()));
            assert_eq!(r.resolve(Some("photo")).unwrap(), FormPart::text("photo", raw));
        }
    }

    #[test]
    fn validate_url_is_a_separate_check() {
        let bad = FileReference::parse("http://[::1").unwrap();
        assert!(matches!(bad.validate_url(), Err(EntityError::InvalidUrl { .. })));
        assert!(FileReference::parse("https://example.com/a.jpg")
            .unwrap()
            .validate_url()
            .is_ok());
        assert!(FileReference::parse("file-id").unwrap().validate_url().is_ok());
    }

    #[test]
    fn url_kept_verbatim() {
        // Url::parse would normalise this to "https://example.com/".
        let r = FileReference::parse("https://example.com").unwrap();
        assert_eq!(r.as_remote_str(), Some("https://example.com"));
        assert_eq!(r.to_string(), "https://example.com");
    }

    #[test]
    fn resolve_identifier_as_text() {
        let r = FileReference::parse("file-id-1").unwrap();
        let part = r.resolve(Some("photo")).unwrap();
        assert_eq!(part, FormPart::text("photo", "file-id-1"));
    }

    #[test]
    fn resolve_falls_back_to_stored_name() {
        let r = FileReference::parse("https://example.com/a.mp3")
            .unwrap()
            .with_name("audio");
        assert_eq!(r.resolve(None).unwrap().name(), "audio");
        assert_eq!(r.resolve(Some("")).unwrap().name(), "audio");
        assert_eq!(r.resolve(Some("voice")).unwrap().name(), "voice");
    }

    #[test]
    fn resolve_without_any_name_fails() {
        let r = FileReference::parse("file-id").unwrap();
        assert!(matches!(r.resolve(None), Err(EntityError::MissingFieldName)));
        assert!(matches!(
            r.resolve(Some("")),
            Err(EntityError::MissingFieldName)
        ));
    }

    #[test]
    fn resolve_local_file_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.jpg");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"abcdefghij")
            .unwrap();

        let r = FileReference::parse(&format!("file://{}", path.display())).unwrap();
        match r.resolve(Some("photo")).unwrap() {
            FormPart::File {
                name,
                file_name,
                mime_type,
                data,
            } => {
                assert_eq!(name, "photo");
                assert_eq!(file_name, "x.jpg");
                assert_eq!(mime_type, "image/jpeg");
                assert_eq!(data, b"abcdefghij");
            }
            other => panic!("expected file part, got {:?}", other),
        }
    }

    #[test]
    fn resolve_missing_local_file_is_io_error() {
        let r = FileReference::parse("file:///no/such/file").unwrap();
        let err = r.resolve(Some("document")).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn serde_uses_string_form() {
        let r = FileReference::parse("file:///tmp/x.jpg").unwrap();
        assert_eq!(serde_json::to_value(&r).unwrap(), "file:///tmp/x.jpg");

        let back: FileReference = serde_json::from_str("\"https://e.com/v.mp4\"").unwrap();
        assert!(matches!(back.source(), FileSource::RemoteUrl(_)));

        let loose: FileReference = serde_json::from_str("\"http://\"").unwrap();
        assert_eq!(loose.as_remote_str(), Some("http://"));

        assert!(serde_json::from_str::<FileReference>("\"\"").is_err());
    }
}
