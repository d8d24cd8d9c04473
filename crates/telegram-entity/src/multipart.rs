//! `multipart/form-data` bodies.
//!
//! Parts are kept as plain values so an encoded request can be inspected
//! before it is sent; [`MultipartBody::into_form`] hands them to reqwest.

use crate::error::{EntityError, EntityResult};
use reqwest::multipart::{Form, Part};

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// A plain text field.
    Text { name: String, value: String },
    /// A binary file upload.
    File {
        name: String,
        file_name: String,
        mime_type: String,
        data: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        FormPart::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Field name of the part.
    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }

    /// Text value, for text parts.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormPart::Text { value, .. } => Some(value),
            FormPart::File { .. } => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FormPart::File { .. })
    }
}

/// An ordered list of form parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    parts: Vec<FormPart>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, part: FormPart) {
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// First part with the given field name.
    pub fn get(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Build the reqwest form, keeping part order.
    pub fn into_form(self) -> EntityResult<Form> {
        let mut form = Form::new();
        for part in self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File {
                    name,
                    file_name,
                    mime_type,
                    data,
                } => {
                    let part = Part::bytes(data)
                        .file_name(file_name)
                        .mime_str(&mime_type)
                        .map_err(|_| EntityError::InvalidMimeType(mime_type))?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MultipartBody {
        let mut body = MultipartBody::new();
        body.push(FormPart::text("chat_id", "42"));
        body.push(FormPart::File {
            name: "photo".into(),
            file_name: "x.jpg".into(),
            mime_type: "image/jpeg".into(),
            data: vec![0xFF, 0xD8, 0x00],
        });
        body
    }

    #[test]
    fn lookup_by_name() {
        let body = sample();
        assert_eq!(body.len(), 2);
        assert_eq!(body.get("chat_id").and_then(FormPart::as_text), Some("42"));
        assert!(body.get("photo").unwrap().is_file());
        assert!(body.get("caption").is_none());
    }

    #[test]
    fn parts_keep_insertion_order() {
        let form = sample();
        let names: Vec<&str> = form.parts().iter().map(FormPart::name).collect();
        assert_eq!(names, vec!["chat_id", "photo"]);
    }

    #[test]
    fn empty_body() {
        let body = MultipartBody::new();
        assert!(body.is_empty());
        assert!(body.into_form().is_ok());
    }

    #[test]
    fn into_form_builds_reqwest_form() {
        let form = sample().into_form().unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn into_form_rejects_bad_mime_type() {
        let mut body = MultipartBody::new();
        body.push(FormPart::File {
            name: "document".into(),
            file_name: "a.bin".into(),
            mime_type: "not a mime".into(),
            data: vec![1],
        });
        match body.into_form() {
            Err(EntityError::InvalidMimeType(mime)) => assert_eq!(mime, "not a mime"),
            other => panic!("expected InvalidMimeType, got {:?}", other.map(|_| ())),
        }
    }
}
