use std::io::Write;

use serde_json::{json, Value};
use telegram_entity::envelope::{InputMedia, InputMediaKind, PollParams, PollType};
use telegram_entity::multipart::FormPart;
use telegram_entity::types::{ChatAction, ParseMode, TgMessage, TgUpdate};
use telegram_entity::webhooks::{extract_commands, parse_update};
use telegram_entity::{
    encode, encode_as, EntityError, FileReference, Media, OutboundMessage, SendParams,
    WebhookConfig, WireFormat,
};

fn fixture(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> FileReference {
    let path = dir.path().join(name);
    std::fs::File::create(&path).unwrap().write_all(data).unwrap();
    FileReference::parse(&format!("file://{}", path.display())).unwrap()
}

#[test]
fn plain_text_message_is_json() {
    let msg = OutboundMessage::text(-1001234567890i64, "*deploy* finished")
        .with_parse_mode(ParseMode::MarkdownV2)
        .silent();
    let payload = encode(&msg).unwrap();
    assert_eq!(payload.format(), WireFormat::Json);
    assert_eq!(
        payload.as_json().unwrap(),
        &json!({
            "chat_id": -1001234567890i64,
            "text": "*deploy* finished",
            "parse_mode": "MarkdownV2",
            "disable_notification": true
        })
    );
}

#[test]
fn poll_is_flattened_into_top_level() {
    let poll = PollParams {
        question: "Ship it?".into(),
        options: vec!["yes".into(), "no".into()],
        is_anonymous: None,
        poll_type: Some(PollType::Regular),
        allows_multiple_answers: true,
        correct_option_id: None,
        explanation: None,
        open_period: None,
        close_date: None,
        is_closed: false,
    };
    let msg = OutboundMessage::params("@release", SendParams::Poll(poll));
    assert_eq!(msg.method(), "sendPoll");

    let payload = encode(&msg).unwrap();
    let body = payload.as_json().unwrap();
    assert_eq!(body["chat_id"], "@release");
    assert_eq!(body["question"], "Ship it?");
    assert_eq!(body["type"], "regular");
    assert_eq!(body["allows_multiple_answers"], true);
    assert!(body.get("is_closed").is_none());
}

#[test]
fn local_upload_becomes_file_part() {
    let dir = tempfile::tempdir().unwrap();
    let doc = fixture(&dir, "report.pdf", b"%PDF-1.4");
    let msg = OutboundMessage::media(7, Media::document(doc)).with_caption("weekly");

    let payload = encode(&msg).unwrap();
    assert_eq!(payload.format(), WireFormat::Multipart);
    let body = payload.as_multipart().unwrap().clone();

    let names: Vec<&str> = body.parts().iter().map(FormPart::name).collect();
    assert_eq!(names, vec!["chat_id", "document", "caption"]);
    assert_eq!(
        body.get("document"),
        Some(&FormPart::File {
            name: "document".into(),
            file_name: "report.pdf".into(),
            mime_type: "application/pdf".into(),
            data: b"%PDF-1.4".to_vec(),
        })
    );
    assert_eq!(body.get("caption").and_then(FormPart::as_text), Some("weekly"));
    assert!(body.into_form().is_ok());
}

#[test]
fn remote_references_are_sent_verbatim() {
    for raw in ["http://", "https://exa mple.com/a.jpg", "http://[::1"] {
        let msg = OutboundMessage::media(7, Media::photo(FileReference::parse(raw).unwrap()));
        let payload = encode(&msg).unwrap();
        let body = payload.as_multipart().unwrap();
        assert_eq!(body.get("photo").and_then(FormPart::as_text), Some(raw));
    }
}

#[test]
fn mixed_media_group_uploads_only_local_items() {
    let dir = tempfile::tempdir().unwrap();
    let local = fixture(&dir, "b.jpg", b"jpeg").with_name("second");
    let msg = OutboundMessage::media_group(
        7,
        vec![
            InputMedia::new(
                InputMediaKind::Photo,
                FileReference::parse("https://example.com/a.jpg").unwrap(),
            ),
            InputMedia::new(InputMediaKind::Photo, local),
        ],
    );
    assert_eq!(msg.method(), "sendMediaGroup");

    let payload = encode(&msg).unwrap();
    let body = payload.as_multipart().unwrap();
    let media: Value =
        serde_json::from_str(body.get("media").and_then(FormPart::as_text).unwrap()).unwrap();
    assert_eq!(media[0]["media"], "https://example.com/a.jpg");
    assert_eq!(media[1]["media"], "attach://second");

    let uploads: Vec<&str> = body
        .parts()
        .iter()
        .filter(|p| p.is_file())
        .map(FormPart::name)
        .collect();
    assert_eq!(uploads, vec!["second"]);
}

#[test]
fn missing_file_yields_no_body() {
    let msg = OutboundMessage::media(
        1,
        Media::photo(FileReference::parse("file:///no/such/file").unwrap()),
    );
    assert!(matches!(encode(&msg), Err(EntityError::Io { .. })));
    assert!(matches!(
        encode_as(&msg, WireFormat::Multipart),
        Err(EntityError::Io { .. })
    ));
}

#[test]
fn conflicting_groups_rejected() {
    let mut msg = OutboundMessage::action(1, ChatAction::Typing);
    msg.media = Some(Media::photo(FileReference::parse("id").unwrap()));
    assert!(matches!(
        encode(&msg),
        Err(EntityError::ConflictingGroups(_, _))
    ));
}

#[test]
fn webhook_update_to_commands() {
    let body = br#"{
        "update_id": 100,
        "message": {
            "message_id": 1,
            "date": 1700000000,
            "chat": {"id": 42, "type": "private", "first_name": "Ada"},
            "from": {"id": 42, "is_bot": false, "first_name": "Ada"},
            "text": "/status@opsbot web db",
            "entities": [{"type": "bot_command", "offset": 0, "length": 14}]
        }
    }"#;
    let update: TgUpdate = parse_update(body).unwrap();
    let msg: &TgMessage = update.message.as_ref().unwrap();
    assert_eq!(msg.command(), "status@opsbot");
    assert_eq!(msg.entities[0].extract(msg.text.as_deref().unwrap()).as_deref(), Some("/status@opsbot"));

    let updates = vec![update.clone()];
    let cmds = extract_commands(&updates);
    assert_eq!(cmds.len(), 1);
    assert_eq!(cmds[0].1, "status@opsbot");
    assert_eq!(cmds[0].2, vec!["web", "db"]);
}

#[test]
fn webhook_config_survives_bad_input() {
    let mut cfg = WebhookConfig::default();
    assert!(cfg.from_json_body(br#"{"url":"https://bot.example.com/hook","ip_address":"203.0.113.7"}"#));
    assert!(!cfg.from_json_body(b"\x00\x01garbage"));
    assert_eq!(cfg.url, "https://bot.example.com/hook");
    assert_eq!(cfg.ip_address, "203.0.113.7");
}
