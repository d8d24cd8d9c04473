//! Shared types for the Telegram entity crate.
//!
//! Covers the client configuration, Bot API response wrappers, the inbound
//! message schema, text entities, reply markup and update envelopes. Every
//! optional field is omitted from the wire when unset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Bot Configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuration for the HTTP client used to reach the Bot API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Human-readable label for this bot.
    #[serde(default)]
    pub name: String,
    /// Bot API token (from @BotFather).
    pub token: String,
    /// Optional custom API base URL (for self-hosted Bot API servers).
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Optional proxy URL (SOCKS5 or HTTP).
    #[serde(default)]
    pub proxy_url: Option<String>,
}

fn default_timeout() -> u64 {
    30
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            token: String::new(),
            api_base_url: None,
            timeout_seconds: default_timeout(),
            proxy_url: None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Bot API response wrappers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Generic wrapper for Telegram Bot API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i32>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

/// Additional response parameters (e.g. rate-limit info).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseParameters {
    #[serde(default)]
    pub migrate_to_chat_id: Option<i64>,
    #[serde(default)]
    pub retry_after: Option<i64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  User / Chat / Message
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Telegram user or bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// Chat type enumeration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    #[default]
    Private,
    Group,
    Supergroup,
    Channel,
}

/// Telegram chat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TgChat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub chat_type: ChatType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_forum: bool,
}

/// A message received from the Bot API.
///
/// `reply_to_message` is a snapshot of the parent message as the server sent
/// it, not a live link. Text and caption entities are not checked against
/// their text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    /// Forum topic the message belongs to (supergroups only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    /// Empty for messages sent to channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<TgUser>,
    /// Set when the message was sent on behalf of a chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_chat: Option<TgChat>,
    /// Unix time.
    pub date: i64,
    pub chat: TgChat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_from: Option<TgUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_from_chat: Option<TgChat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_from_message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_signature: Option<String>,
    /// Sender name for users who hide their account in forwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_date: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_topic_message: bool,
    /// Channel post automatically forwarded to the linked discussion group.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_automatic_forward: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message: Option<Box<TgMessage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_bot: Option<TgUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_date: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_protected_content: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<MessageEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<TgAnimation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<TgAudio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<TgDocument>,
    /// Available sizes of the photo.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photo: Vec<PhotoSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker: Option<TgSticker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<TgVideo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_note: Option<TgVideoNote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<TgVoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caption_entities: Vec<MessageEntity>,
}

impl TgMessage {
    /// Command token of a `/command` message.
    ///
    /// Returns the text between the leading `/` and the first space (or the
    /// end of the text), and an empty string for anything that is not a
    /// command. The token itself is not validated, so `"/start@bot hi"`
    /// yields `"start@bot"`.
    pub fn command(&self) -> &str {
        let text = self.text.as_deref().unwrap_or_default();
        if !text.starts_with('/') {
            return "";
        }
        let end = text.find(' ').unwrap_or(text.len());
        &text[1..end]
    }

    /// Send time as a UTC timestamp.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.date, 0)
    }

    /// Last edit time, if the message was edited.
    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        self.edit_date.and_then(|d| DateTime::from_timestamp(d, 0))
    }

    /// Largest available photo size.
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo.iter().max_by_key(|p| p.width.saturating_mul(p.height))
    }
}

/// Kind of a [`MessageEntity`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Mention,
    Hashtag,
    Cashtag,
    BotCommand,
    Url,
    Email,
    PhoneNumber,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Code,
    Pre,
    TextLink,
    TextMention,
    CustomEmoji,
    #[serde(other)]
    Other,
}

/// Message entity (bold, italic, link, etc.).
///
/// `offset` and `length` are measured in UTF-16 code units of the text the
/// entity belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub offset: i64,
    pub length: i64,
    /// `text_link` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `text_mention` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<TgUser>,
    /// `pre` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// `custom_emoji` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_emoji_id: Option<String>,
}

impl MessageEntity {
    pub fn new(kind: EntityKind, offset: i64, length: i64) -> Self {
        Self {
            kind,
            offset,
            length,
            url: None,
            user: None,
            language: None,
            custom_emoji_id: None,
        }
    }

    /// Substring of `text` covered by this entity.
    ///
    /// `None` when the span falls outside the text or splits a surrogate
    /// pair.
    pub fn extract(&self, text: &str) -> Option<String> {
        let start = usize::try_from(self.offset).ok()?;
        let len = usize::try_from(self.length).ok()?;
        let end = start.checked_add(len)?;
        let units: Vec<u16> = text.encode_utf16().collect();
        let span = units.get(start..end)?;
        String::from_utf16(span).ok()
    }
}

/// Photo size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub file_unique_id: String,
    pub width: i64,
    pub height: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

/// Animation (GIF or H.264/MPEG-4 AVC video without sound).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgAnimation {
    pub file_id: String,
    pub file_unique_id: String,
    pub width: i64,
    pub height: i64,
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PhotoSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

/// Document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgDocument {
    pub file_id: String,
    pub file_unique_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PhotoSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

/// Video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgVideo {
    pub file_id: String,
    pub file_unique_id: String,
    pub width: i64,
    pub height: i64,
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PhotoSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

/// Video note (round video message).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgVideoNote {
    pub file_id: String,
    pub file_unique_id: String,
    /// Width and height (diameter).
    pub length: i64,
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PhotoSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

/// Audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgAudio {
    pub file_id: String,
    pub file_unique_id: String,
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PhotoSize>,
}

/// Voice message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgVoice {
    pub file_id: String,
    pub file_unique_id: String,
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

/// Sticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgSticker {
    pub file_id: String,
    pub file_unique_id: String,
    pub width: i64,
    pub height: i64,
    #[serde(default)]
    pub is_animated: bool,
    #[serde(default)]
    pub is_video: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PhotoSize>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Chat id / parse mode / actions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Chat ID can be a numeric ID or a @username string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChatId {
    Numeric(i64),
    Username(String),
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatId::Numeric(id) => write!(f, "{}", id),
            ChatId::Username(name) => write!(f, "{}", name),
        }
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        ChatId::Numeric(id)
    }
}

impl From<i32> for ChatId {
    fn from(id: i32) -> Self {
        ChatId::Numeric(i64::from(id))
    }
}

impl From<&str> for ChatId {
    fn from(name: &str) -> Self {
        ChatId::Username(name.to_string())
    }
}

impl From<String> for ChatId {
    fn from(name: String) -> Self {
        ChatId::Username(name)
    }
}

/// Message parse mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ParseMode {
    #[serde(rename = "Markdown")]
    Markdown,
    #[serde(rename = "MarkdownV2")]
    MarkdownV2,
    #[serde(rename = "HTML")]
    Html,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
            ParseMode::MarkdownV2 => "MarkdownV2",
            ParseMode::Html => "HTML",
        }
    }
}

/// Chat action to broadcast via sendChatAction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    Typing,
    UploadPhoto,
    RecordVideo,
    UploadVideo,
    RecordVoice,
    UploadVoice,
    UploadDocument,
    ChooseSticker,
    FindLocation,
    RecordVideoNote,
    UploadVideoNote,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Keyboards
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Inline keyboard markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// A single inline keyboard button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_inline_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switch_inline_query_current_chat: Option<String>,
}

impl InlineKeyboardButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            callback_data: Some(data.into()),
            switch_inline_query: None,
            switch_inline_query_current_chat: None,
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: Some(url.into()),
            callback_data: None,
            switch_inline_query: None,
            switch_inline_query_current_chat: None,
        }
    }
}

/// Reply keyboard markup (custom keyboard).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize_keyboard: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_time_keyboard: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_field_placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selective: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_persistent: Option<bool>,
}

/// A single keyboard button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyboardButton {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_contact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_location: Option<bool>,
}

/// Remove keyboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyKeyboardRemove {
    pub remove_keyboard: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selective: Option<bool>,
}

/// Force reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceReply {
    pub force_reply: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_field_placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selective: Option<bool>,
}

/// Union type for reply markup. Exactly one variant is sent per message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    InlineKeyboard(InlineKeyboardMarkup),
    ReplyKeyboard(ReplyKeyboardMarkup),
    ReplyKeyboardRemove(ReplyKeyboardRemove),
    ForceReply(ForceReply),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Updates
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An incoming update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TgUpdate {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<TgMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_message: Option<TgMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_post: Option<TgMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_channel_post: Option<TgMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
}

/// Callback query from inline keyboard press.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: TgUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<TgMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    pub chat_instance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}
