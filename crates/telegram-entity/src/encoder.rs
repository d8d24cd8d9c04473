//! Turns an [`OutboundMessage`] into a request body.
//!
//! Every populated field is written under its fixed wire name. Unset,
//! empty, zero, `false` and empty-list fields are left out. A message with any file
//! reference is encoded as `multipart/form-data`; everything else goes out
//! as a JSON object.

use crate::envelope::{InputMedia, Media, OutboundMessage};
use crate::error::{EntityError, EntityResult};
use crate::multipart::{FormPart, MultipartBody};
use crate::reference::FileReference;
use log::debug;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Body encoding of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Json,
    Multipart,
}

/// An encoded request body, handed to the transport as is.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Multipart(MultipartBody),
}

impl Payload {
    pub fn format(&self) -> WireFormat {
        match self {
            Payload::Json(_) => WireFormat::Json,
            Payload::Multipart(_) => WireFormat::Multipart,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(v) => Some(v),
            Payload::Multipart(_) => None,
        }
    }

    pub fn as_multipart(&self) -> Option<&MultipartBody> {
        match self {
            Payload::Multipart(m) => Some(m),
            Payload::Json(_) => None,
        }
    }

    /// Number of top-level fields or form parts.
    pub fn field_count(&self) -> usize {
        match self {
            Payload::Json(v) => v.as_object().map_or(0, Map::len),
            Payload::Multipart(m) => m.len(),
        }
    }
}

/// Encode `msg`, picking multipart when it carries any file reference.
pub fn encode(msg: &OutboundMessage) -> EntityResult<Payload> {
    msg.validate()?;
    let fields = collect_fields(msg)?;
    let format = if fields.iter().any(|f| f.value.is_reference()) {
        WireFormat::Multipart
    } else {
        WireFormat::Json
    };
    debug!(
        "Encoding {} for {} as {:?} ({} fields)",
        msg.method(),
        msg.chat_id,
        format,
        fields.len()
    );
    render(fields, format)
}

/// Encode `msg` in a fixed format.
///
/// JSON accepts identifier and URL references as plain strings but fails on
/// local files, which can only be uploaded as multipart.
pub fn encode_as(msg: &OutboundMessage, format: WireFormat) -> EntityResult<Payload> {
    msg.validate()?;
    let fields = collect_fields(msg)?;
    render(fields, format)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Field collection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

enum FieldValue<'a> {
    Value(Value),
    Reference(&'a FileReference),
}

impl FieldValue<'_> {
    fn is_reference(&self) -> bool {
        matches!(self, FieldValue::Reference(_))
    }
}

struct Field<'a> {
    name: String,
    value: FieldValue<'a>,
}

#[derive(Default)]
struct Fields<'a> {
    items: Vec<Field<'a>>,
}

impl<'a> Fields<'a> {
    fn value(&mut self, name: impl Into<String>, value: Value) {
        self.items.push(Field {
            name: name.into(),
            value: FieldValue::Value(value),
        });
    }

    fn string(&mut self, name: &'static str, value: &Option<String>) {
        match value {
            Some(v) if !v.is_empty() => self.value(name, json!(v)),
            _ => {}
        }
    }

    fn int(&mut self, name: &'static str, value: Option<i64>) {
        match value {
            Some(v) if v != 0 => self.value(name, json!(v)),
            _ => {}
        }
    }

    fn flag(&mut self, name: &'static str, value: bool) {
        if value {
            self.value(name, json!(true));
        }
    }

    fn record<T: Serialize>(&mut self, name: &'static str, value: &T) -> EntityResult<()> {
        let v = serde_json::to_value(value)
            .map_err(|source| EntityError::Serialize { field: name, source })?;
        self.value(name, v);
        Ok(())
    }

    fn list<T: Serialize>(&mut self, name: &'static str, items: &[T]) -> EntityResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        self.record(name, &items)
    }

    fn reference(&mut self, name: impl Into<String>, reference: &'a FileReference) {
        self.items.push(Field {
            name: name.into(),
            value: FieldValue::Reference(reference),
        });
    }

    fn thumb(&mut self, thumb: &'a Option<FileReference>) {
        if let Some(t) = thumb {
            self.reference("thumb", t);
        }
    }
}

fn collect_fields(msg: &OutboundMessage) -> EntityResult<Vec<Field<'_>>> {
    let mut f = Fields::default();

    f.record("chat_id", &msg.chat_id)?;
    f.int("message_thread_id", msg.message_thread_id);
    f.string("text", &msg.text);
    if let Some(pm) = msg.parse_mode {
        f.value("parse_mode", json!(pm.as_str()));
    }
    f.list("entities", &msg.entities)?;
    f.flag("disable_web_page_preview", msg.disable_web_page_preview);
    f.flag("disable_notification", msg.disable_notification);
    f.flag("protect_content", msg.protect_content);
    f.int("reply_to_message_id", msg.reply_to_message_id);
    f.flag("allow_sending_without_reply", msg.allow_sending_without_reply);
    if let Some(ref markup) = msg.reply_markup {
        f.record("reply_markup", markup)?;
    }

    if let Some(ref media) = msg.media {
        collect_media(&mut f, media);
    }
    f.string("caption", &msg.caption);
    f.list("caption_entities", &msg.caption_entities)?;

    if !msg.media_group.is_empty() {
        collect_media_group(&mut f, &msg.media_group)?;
    }

    if let Some(ref params) = msg.params {
        // Flattened into the top level of the request.
        let value = serde_json::to_value(params).map_err(|source| EntityError::Serialize {
            field: params.group_name(),
            source,
        })?;
        if let Value::Object(map) = value {
            for (key, v) in map {
                f.value(key, v);
            }
        }
    }

    if let Some(action) = msg.action {
        f.record("action", &action)?;
    }

    Ok(f.items)
}

fn collect_media<'a>(f: &mut Fields<'a>, media: &'a Media) {
    f.reference(media.field_name(), media.file());
    match media {
        Media::Photo { .. } => {}
        Media::Audio {
            duration,
            performer,
            title,
            thumb,
            ..
        } => {
            f.int("duration", *duration);
            f.string("performer", performer);
            f.string("title", title);
            f.thumb(thumb);
        }
        Media::Document {
            thumb,
            disable_content_type_detection,
            ..
        } => {
            f.thumb(thumb);
            f.flag(
                "disable_content_type_detection",
                *disable_content_type_detection,
            );
        }
        Media::Video {
            duration,
            width,
            height,
            supports_streaming,
            thumb,
            ..
        } => {
            f.int("duration", *duration);
            f.int("width", *width);
            f.int("height", *height);
            f.flag("supports_streaming", *supports_streaming);
            f.thumb(thumb);
        }
        Media::Animation {
            duration,
            width,
            height,
            thumb,
            ..
        } => {
            f.int("duration", *duration);
            f.int("width", *width);
            f.int("height", *height);
            f.thumb(thumb);
        }
        Media::Voice { duration, .. } => {
            f.int("duration", *duration);
        }
        Media::VideoNote {
            duration,
            length,
            thumb,
            ..
        } => {
            f.int("duration", *duration);
            f.int("length", *length);
            f.thumb(thumb);
        }
    }
}

/// Top-level wire names an attachment part must not shadow.
const RESERVED_FIELDS: &[&str] = &[
    "chat_id",
    "message_thread_id",
    "text",
    "parse_mode",
    "entities",
    "disable_web_page_preview",
    "disable_notification",
    "protect_content",
    "reply_to_message_id",
    "allow_sending_without_reply",
    "reply_markup",
    "caption",
    "caption_entities",
    "media",
    "thumb",
    "action",
];

/// Media groups are sent as one JSON array. Local files inside it are
/// replaced by `attach://<name>` and uploaded as separate parts.
///
/// Attachment names are unique within the request. A missing, repeated or
/// reserved stored name falls back to `file<index>`.
fn collect_media_group<'a>(f: &mut Fields<'a>, items: &'a [InputMedia]) -> EntityResult<()> {
    let mut array = Vec::with_capacity(items.len());
    let mut attachments = Vec::new();
    let mut used: HashSet<String> = RESERVED_FIELDS.iter().map(|n| n.to_string()).collect();
    used.extend(f.items.iter().map(|field| field.name.clone()));

    for (index, item) in items.iter().enumerate() {
        let mut value = serde_json::to_value(item).map_err(|source| EntityError::Serialize {
            field: "media",
            source,
        })?;
        if item.media.is_local() {
            let name = attachment_name(&mut used, item.media.name(), index);
            value["media"] = json!(format!("attach://{}", name));
            attachments.push((name, &item.media));
        }
        array.push(value);
    }

    f.value("media", Value::Array(array));
    for (name, reference) in attachments {
        f.reference(name, reference);
    }
    Ok(())
}

fn attachment_name(used: &mut HashSet<String>, stored: Option<&str>, index: usize) -> String {
    if let Some(name) = stored.filter(|n| !n.is_empty()) {
        if used.insert(name.to_string()) {
            return name.to_string();
        }
    }
    let mut name = format!("file{}", index);
    let mut suffix = 1;
    while !used.insert(name.clone()) {
        name = format!("file{}_{}", index, suffix);
        suffix += 1;
    }
    name
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Rendering
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn render(fields: Vec<Field<'_>>, format: WireFormat) -> EntityResult<Payload> {
    match format {
        WireFormat::Json => {
            let mut map = Map::new();
            for field in fields {
                let value = match field.value {
                    FieldValue::Value(v) => v,
                    FieldValue::Reference(r) => match r.as_remote_str() {
                        Some(s) => json!(s),
                        None => return Err(EntityError::UploadRequiresMultipart(field.name)),
                    },
                };
                map.insert(field.name, value);
            }
            Ok(Payload::Json(Value::Object(map)))
        }
        WireFormat::Multipart => {
            let mut body = MultipartBody::new();
            for field in fields {
                let part = match field.value {
                    FieldValue::Value(v) => FormPart::Text {
                        name: field.name,
                        value: text_value(v),
                    },
                    FieldValue::Reference(r) => r.resolve(Some(&field.name))?,
                };
                body.push(part);
            }
            Ok(Payload::Multipart(body))
        }
    }
}

/// Multipart text form of a JSON value: strings raw, everything else as JSON.
fn text_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
