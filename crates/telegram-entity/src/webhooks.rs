//! Webhooks & updates: webhook registration state and inbound update decoding.

use crate::encoder::Payload;
use crate::error::EntityResult;
use crate::types::*;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Where Telegram delivers updates for this bot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub url: String,
    /// Fixed IP used instead of resolving `url` through DNS.
    #[serde(default)]
    pub ip_address: String,
}

/// Fields present in a webhook body. Absent keys leave the current value.
#[derive(Deserialize)]
struct WebhookPatch {
    url: Option<String>,
    ip_address: Option<String>,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ip_address: String::new(),
        }
    }

    /// Update in place from a JSON body.
    ///
    /// Keys present in `body` overwrite the current values. A body that does
    /// not decode is logged and ignored, and `false` is returned.
    pub fn from_json_body(&mut self, body: &[u8]) -> bool {
        match serde_json::from_slice::<WebhookPatch>(body) {
            Ok(patch) => {
                if let Some(url) = patch.url {
                    self.url = url;
                }
                if let Some(ip) = patch.ip_address {
                    self.ip_address = ip;
                }
                debug!("Webhook config updated: {}", self.url);
                true
            }
            Err(e) => {
                warn!("Ignoring malformed webhook body: {}", e);
                false
            }
        }
    }

    /// Body for `setWebhook`.
    pub fn set_webhook_payload(&self) -> Payload {
        let mut body = json!({ "url": self.url });
        if !self.ip_address.is_empty() {
            body["ip_address"] = json!(self.ip_address);
        }
        Payload::Json(body)
    }
}

/// Body for `getUpdates` (long polling).
pub fn get_updates_payload(offset: Option<i64>, limit: Option<i64>, timeout: Option<i64>) -> Payload {
    let mut body = json!({});
    if let Some(o) = offset {
        body["offset"] = json!(o);
    }
    if let Some(l) = limit {
        body["limit"] = json!(l);
    }
    if let Some(t) = timeout {
        body["timeout"] = json!(t);
    }
    Payload::Json(body)
}

/// Decode one update as posted to a webhook.
pub fn parse_update(body: &[u8]) -> EntityResult<TgUpdate> {
    let update: TgUpdate = serde_json::from_slice(body)?;
    debug!("Received update {}", update.update_id);
    Ok(update)
}

/// Offset for the next `getUpdates` call.
pub fn next_offset(updates: &[TgUpdate]) -> Option<i64> {
    updates.iter().map(|u| u.update_id).max().map(|id| id + 1)
}

/// Filter updates to only include messages.
pub fn message_updates(updates: &[TgUpdate]) -> Vec<&TgMessage> {
    updates.iter().filter_map(|u| u.message.as_ref()).collect()
}

/// Command messages with their command token and whitespace-split arguments.
pub fn extract_commands(updates: &[TgUpdate]) -> Vec<(&TgMessage, String, Vec<String>)> {
    message_updates(updates)
        .into_iter()
        .filter_map(|msg| {
            let command = msg.command();
            if command.is_empty() {
                return None;
            }
            let args = msg
                .text
                .as_deref()
                .and_then(|t| t.split_once(' '))
                .map(|(_, rest)| rest.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default();
            Some((msg, command.to_string(), args))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_update(id: i64) -> TgUpdate {
        TgUpdate {
            update_id: id,
            ..Default::default()
        }
    }

    fn make_text_update(id: i64, text: &str) -> TgUpdate {
        TgUpdate {
            update_id: id,
            message: Some(TgMessage {
                message_id: id,
                text: Some(text.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn from_json_body_sets_fields() {
        let mut cfg = WebhookConfig::default();
        assert!(cfg.from_json_body(br#"{"url":"https://bot.example.com/hook","ip_address":"10.0.0.1"}"#));
        assert_eq!(cfg.url, "https://bot.example.com/hook");
        assert_eq!(cfg.ip_address, "10.0.0.1");
    }

    #[test]
    fn from_json_body_keeps_absent_fields() {
        let mut cfg = WebhookConfig {
            url: "https://old".into(),
            ip_address: "1.2.3.4".into(),
        };
        assert!(cfg.from_json_body(br#"{"url":"https://new"}"#));
        assert_eq!(cfg.url, "https://new");
        assert_eq!(cfg.ip_address, "1.2.3.4");
    }

    #[test]
    fn malformed_body_leaves_config_unchanged() {
        let before = WebhookConfig {
            url: "https://old".into(),
            ip_address: "1.2.3.4".into(),
        };
        let mut cfg = before.clone();
        assert!(!cfg.from_json_body(b"{not json"));
        assert!(!cfg.from_json_body(br#"{"url": 5}"#));
        assert!(!cfg.from_json_body(b""));
        assert_eq!(cfg, before);
    }

    #[test]
    fn set_webhook_payload_omits_empty_ip() {
        let payload = WebhookConfig::new("https://e.com/hook").set_webhook_payload();
        assert_eq!(payload.as_json().unwrap(), &json!({ "url": "https://e.com/hook" }));
    }

    #[test]
    fn get_updates_payload_params() {
        let empty = get_updates_payload(None, None, None);
        assert_eq!(empty.as_json().unwrap(), &json!({}));
        let full = get_updates_payload(Some(100), Some(50), Some(30));
        let v = full.as_json().unwrap();
        assert_eq!(v["offset"], 100);
        assert_eq!(v["limit"], 50);
        assert_eq!(v["timeout"], 30);
    }

    #[test]
    fn parse_update_with_message() {
        let body = br#"{
            "update_id": 7,
            "message": {
                "message_id": 3,
                "date": 1700000000,
                "chat": {"id": -100, "type": "supergroup", "title": "Ops"},
                "text": "/deploy prod"
            }
        }"#;
        let update = parse_update(body).unwrap();
        assert_eq!(update.update_id, 7);
        let msg = update.message.unwrap();
        assert_eq!(msg.chat.id, -100);
        assert_eq!(msg.command(), "deploy");
    }

    #[test]
    fn parse_update_rejects_garbage() {
        assert!(parse_update(b"[]").is_err());
    }

    #[test]
    fn next_offset_empty() {
        assert_eq!(next_offset(&[]), None);
    }

    #[test]
    fn next_offset_computes() {
        let updates = vec![make_update(10), make_update(12), make_update(11)];
        assert_eq!(next_offset(&updates), Some(13));
    }

    #[test]
    fn message_updates_skips_non_messages() {
        let updates = vec![make_update(1), make_text_update(2, "hi")];
        let msgs = message_updates(&updates);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].text.as_deref(), Some("hi"));
    }

    #[test]
    fn extract_commands_from_updates() {
        let updates = vec![
            make_text_update(1, "/start"),
            make_text_update(2, "hello"),
            make_text_update(3, "/echo@mybot  foo bar"),
            make_update(4),
        ];
        let cmds = extract_commands(&updates);
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].1, "start");
        assert!(cmds[0].2.is_empty());
        assert_eq!(cmds[1].1, "echo@mybot");
        assert_eq!(cmds[1].2, vec!["foo", "bar"]);
    }
}
