//! Outbound message envelope: the parameters of one send call.
//!
//! One `OutboundMessage` covers every `send*` method. Besides the shared
//! fields it carries at most one of: a media attachment, a parameter group
//! (location, contact, poll, dice), a media group, or a chat action. The
//! constructors populate exactly one of them and [`OutboundMessage::validate`]
//! rejects anything else.

use crate::error::{EntityError, EntityResult};
use crate::reference::FileReference;
use crate::types::*;
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Media
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single media attachment and the attributes that belong to its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Media {
    Photo {
        photo: FileReference,
    },
    Audio {
        audio: FileReference,
        duration: Option<i64>,
        performer: Option<String>,
        title: Option<String>,
        thumb: Option<FileReference>,
    },
    Document {
        document: FileReference,
        thumb: Option<FileReference>,
        disable_content_type_detection: bool,
    },
    Video {
        video: FileReference,
        duration: Option<i64>,
        width: Option<i64>,
        height: Option<i64>,
        supports_streaming: bool,
        thumb: Option<FileReference>,
    },
    Animation {
        animation: FileReference,
        duration: Option<i64>,
        width: Option<i64>,
        height: Option<i64>,
        thumb: Option<FileReference>,
    },
    Voice {
        voice: FileReference,
        duration: Option<i64>,
    },
    /// Sending video notes by URL is not supported by Telegram.
    VideoNote {
        video_note: FileReference,
        duration: Option<i64>,
        /// Diameter of the video.
        length: Option<i64>,
        thumb: Option<FileReference>,
    },
}

impl Media {
    pub fn photo(photo: FileReference) -> Self {
        Media::Photo { photo }
    }

    pub fn audio(audio: FileReference) -> Self {
        Media::Audio {
            audio,
            duration: None,
            performer: None,
            title: None,
            thumb: None,
        }
    }

    pub fn document(document: FileReference) -> Self {
        Media::Document {
            document,
            thumb: None,
            disable_content_type_detection: false,
        }
    }

    pub fn video(video: FileReference) -> Self {
        Media::Video {
            video,
            duration: None,
            width: None,
            height: None,
            supports_streaming: false,
            thumb: None,
        }
    }

    pub fn animation(animation: FileReference) -> Self {
        Media::Animation {
            animation,
            duration: None,
            width: None,
            height: None,
            thumb: None,
        }
    }

    pub fn voice(voice: FileReference) -> Self {
        Media::Voice {
            voice,
            duration: None,
        }
    }

    pub fn video_note(video_note: FileReference) -> Self {
        Media::VideoNote {
            video_note,
            duration: None,
            length: None,
            thumb: None,
        }
    }

    /// Wire name of the main file field.
    pub fn field_name(&self) -> &'static str {
        match self {
            Media::Photo { .. } => "photo",
            Media::Audio { .. } => "audio",
            Media::Document { .. } => "document",
            Media::Video { .. } => "video",
            Media::Animation { .. } => "animation",
            Media::Voice { .. } => "voice",
            Media::VideoNote { .. } => "video_note",
        }
    }

    /// Bot API method used to send this kind of media.
    pub fn method(&self) -> &'static str {
        match self {
            Media::Photo { .. } => "sendPhoto",
            Media::Audio { .. } => "sendAudio",
            Media::Document { .. } => "sendDocument",
            Media::Video { .. } => "sendVideo",
            Media::Animation { .. } => "sendAnimation",
            Media::Voice { .. } => "sendVoice",
            Media::VideoNote { .. } => "sendVideoNote",
        }
    }

    /// The main file reference.
    pub fn file(&self) -> &FileReference {
        match self {
            Media::Photo { photo } => photo,
            Media::Audio { audio, .. } => audio,
            Media::Document { document, .. } => document,
            Media::Video { video, .. } => video,
            Media::Animation { animation, .. } => animation,
            Media::Voice { voice, .. } => voice,
            Media::VideoNote { video_note, .. } => video_note,
        }
    }

    pub fn thumb(&self) -> Option<&FileReference> {
        match self {
            Media::Audio { thumb, .. }
            | Media::Document { thumb, .. }
            | Media::Video { thumb, .. }
            | Media::Animation { thumb, .. }
            | Media::VideoNote { thumb, .. } => thumb.as_ref(),
            Media::Photo { .. } | Media::Voice { .. } => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Media groups
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Kind of an [`InputMedia`] item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputMediaKind {
    Photo,
    Video,
    Animation,
    Audio,
    Document,
}

/// One item of a `sendMediaGroup` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputMedia {
    #[serde(rename = "type")]
    pub kind: InputMediaKind,
    pub media: FileReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caption_entities: Vec<MessageEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub supports_streaming: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl InputMedia {
    pub fn new(kind: InputMediaKind, media: FileReference) -> Self {
        Self {
            kind,
            media,
            caption: None,
            parse_mode: None,
            caption_entities: Vec::new(),
            width: None,
            height: None,
            duration: None,
            supports_streaming: false,
            performer: None,
            title: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Parameter groups
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parameters of `sendLocation`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationParams {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_accuracy: Option<f64>,
    /// Seconds the location stays live (60–86400).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_period: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proximity_alert_radius: Option<i64>,
}

/// Parameters of `sendContact`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactParams {
    pub phone_number: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcard: Option<String>,
}

/// Poll type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PollType {
    Regular,
    Quiz,
}

/// Parameters of `sendPoll`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollParams {
    pub question: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_anonymous: Option<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub poll_type: Option<PollType>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allows_multiple_answers: bool,
    /// Quiz polls only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_option_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_period: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_date: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_closed: bool,
}

/// Parameters of `sendDice`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiceParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// A parameter group flattened into the top level of the request.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SendParams {
    Location(LocationParams),
    Contact(ContactParams),
    Poll(PollParams),
    Dice(DiceParams),
}

impl SendParams {
    pub fn group_name(&self) -> &'static str {
        match self {
            SendParams::Location(_) => "location",
            SendParams::Contact(_) => "contact",
            SendParams::Poll(_) => "poll",
            SendParams::Dice(_) => "dice",
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            SendParams::Location(_) => "sendLocation",
            SendParams::Contact(_) => "sendContact",
            SendParams::Poll(_) => "sendPoll",
            SendParams::Dice(_) => "sendDice",
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Envelope
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parameters for one outbound API call.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// Target chat id or `@channelusername`.
    pub chat_id: ChatId,
    /// Forum topic (forum supergroups only).
    pub message_thread_id: Option<i64>,
    /// 1–4096 characters after entity parsing.
    pub text: Option<String>,
    pub parse_mode: Option<ParseMode>,
    /// Used instead of `parse_mode`.
    pub entities: Vec<MessageEntity>,
    pub disable_web_page_preview: bool,
    pub disable_notification: bool,
    pub protect_content: bool,
    pub reply_to_message_id: Option<i64>,
    /// Send even if the replied-to message is gone.
    pub allow_sending_without_reply: bool,
    pub reply_markup: Option<ReplyMarkup>,
    pub caption: Option<String>,
    pub caption_entities: Vec<MessageEntity>,
    pub media: Option<Media>,
    /// 2–10 items for `sendMediaGroup`.
    pub media_group: Vec<InputMedia>,
    pub params: Option<SendParams>,
    pub action: Option<ChatAction>,
}

impl OutboundMessage {
    /// Envelope with only the chat id set.
    pub fn new(chat_id: impl Into<ChatId>) -> Self {
        Self {
            chat_id: chat_id.into(),
            message_thread_id: None,
            text: None,
            parse_mode: None,
            entities: Vec::new(),
            disable_web_page_preview: false,
            disable_notification: false,
            protect_content: false,
            reply_to_message_id: None,
            allow_sending_without_reply: false,
            reply_markup: None,
            caption: None,
            caption_entities: Vec::new(),
            media: None,
            media_group: Vec::new(),
            params: None,
            action: None,
        }
    }

    pub fn text(chat_id: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(chat_id)
        }
    }

    pub fn media(chat_id: impl Into<ChatId>, media: Media) -> Self {
        Self {
            media: Some(media),
            ..Self::new(chat_id)
        }
    }

    pub fn media_group(chat_id: impl Into<ChatId>, items: Vec<InputMedia>) -> Self {
        Self {
            media_group: items,
            ..Self::new(chat_id)
        }
    }

    pub fn params(chat_id: impl Into<ChatId>, params: SendParams) -> Self {
        Self {
            params: Some(params),
            ..Self::new(chat_id)
        }
    }

    pub fn action(chat_id: impl Into<ChatId>, action: ChatAction) -> Self {
        Self {
            action: Some(action),
            ..Self::new(chat_id)
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = Some(parse_mode);
        self
    }

    pub fn with_reply_markup(mut self, markup: ReplyMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }

    pub fn silent(mut self) -> Self {
        self.disable_notification = true;
        self
    }

    /// Names of the populated exclusive groups, in field order.
    fn populated_groups(&self) -> Vec<&'static str> {
        let mut groups = Vec::new();
        if self.media.is_some() {
            groups.push("media");
        }
        if !self.media_group.is_empty() {
            groups.push("media_group");
        }
        if let Some(ref p) = self.params {
            groups.push(p.group_name());
        }
        if self.action.is_some() {
            groups.push("action");
        }
        groups
    }

    /// Check that at most one exclusive group is populated.
    pub fn validate(&self) -> EntityResult<()> {
        match self.populated_groups().as_slice() {
            [first, second, ..] => Err(EntityError::ConflictingGroups(*first, *second)),
            _ => Ok(()),
        }
    }

    /// Bot API method for the populated group.
    pub fn method(&self) -> &'static str {
        if self.action.is_some() {
            return "sendChatAction";
        }
        if !self.media_group.is_empty() {
            return "sendMediaGroup";
        }
        if let Some(ref media) = self.media {
            return media.method();
        }
        if let Some(ref params) = self.params {
            return params.method();
        }
        "sendMessage"
    }
}
