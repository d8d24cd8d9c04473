//! # Telegram Entity
//!
//! Telegram Bot API data types plus the encoder that turns an outbound
//! message into a request body.
//!
//! ## Features
//!
//! - **Inbound schema** – messages, chats, users, media and text entities as
//!   delivered in updates
//! - **Outbound envelope** – one `OutboundMessage` for text, media, media
//!   groups, location, contact, poll, dice and chat actions
//! - **File references** – file ids, remote URLs and local uploads, classified
//!   once at construction
//! - **Payload encoding** – JSON when nothing needs uploading, otherwise
//!   `multipart/form-data`
//! - **Webhooks & updates** – webhook config decoding and update helpers
//! - **Client** – Bot API calls over a pluggable async transport

pub mod types;
pub mod error;
pub mod files;
pub mod multipart;
pub mod reference;
pub mod envelope;
pub mod encoder;
pub mod webhooks;
pub mod client;

pub use client::{HttpTransport, TelegramClient, Transport};
pub use encoder::{encode, encode_as, Payload, WireFormat};
pub use envelope::{Media, OutboundMessage, SendParams};
pub use error::{EntityError, EntityResult};
pub use reference::{FileReference, FileSource};
pub use webhooks::WebhookConfig;
