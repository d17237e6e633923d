//! End-to-end handler tests against a scripted Bot API stub.

mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use telegram_handler::test_utils::CollectingDiagnostics;
use telegram_handler::{
    ChatId, Formatter, Level, LogRecord, MAX_MESSAGE_BYTES, SharedFormatter, TelegramHandler,
    TelegramHandlerBuilder, TextFormatter,
};

use test_utils::{
    CannedResponse, MultipartPart, multipart_parts, refused_endpoint, spawn_api_server,
};

const TOKEN: &str = "123:abc";

/// Result payload of a successful `sendMessage`/`sendDocument` exchange.
const MESSAGE_RESULT: &str = r#"{"message_id":5,"chat":{"id":42}}"#;

fn builder(base_url: &str, diagnostics: &CollectingDiagnostics) -> TelegramHandlerBuilder {
    TelegramHandler::builder(TOKEN)
        .with_api_base_url(base_url)
        .with_timeout(Duration::from_secs(5))
        .with_diagnostics(Arc::new(diagnostics.clone()))
}

fn error_record(message: &str) -> LogRecord {
    LogRecord::new("app", Level::Error, message)
}

fn part<'a>(parts: &'a [MultipartPart], name: &str) -> &'a MultipartPart {
    parts
        .iter()
        .find(|part| part.name == name)
        .unwrap_or_else(|| panic!("missing multipart part {name:?}"))
}

#[test]
fn resolves_chat_id_from_newest_update() {
    let updates = r#"[
        {"update_id":1,"message":{"message_id":10,"chat":{"id":7},"text":"hi"}},
        {"update_id":2,"message":{"message_id":11,"chat":{"id":42},"text":"latest"}}
    ]"#;
    let (base_url, rx) = spawn_api_server(vec![CannedResponse::ok(updates)]);
    let diagnostics = CollectingDiagnostics::new();

    let handler = builder(&base_url, &diagnostics).build().expect("build");

    assert!(!handler.is_disabled());
    assert_eq!(handler.chat_id(), Some(&ChatId::Id(42)));
    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.path, "/bot123:abc/getUpdates");
    assert!(
        diagnostics
            .debugs()
            .iter()
            .any(|message| message.contains("resolved chat id 42"))
    );
}

#[test]
fn bootstrap_rejection_disables_handler() {
    let (base_url, rx) = spawn_api_server(vec![CannedResponse::rejection(401, "Unauthorized")]);
    let diagnostics = CollectingDiagnostics::new();

    let handler = builder(&base_url, &diagnostics).build().expect("build");

    assert!(handler.is_disabled());
    assert_eq!(handler.chat_id(), None);
    assert!(
        diagnostics
            .errors()
            .iter()
            .any(|message| message.contains("chat id resolution failed"))
    );

    // Disabled is terminal: later records are dropped without touching the
    // wire.
    handler.emit(&error_record("dropped"));
    rx.recv_timeout(Duration::from_secs(5))
        .expect("bootstrap request");
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn bootstrap_rejection_on_a_200_response_disables_handler() {
    // Rejection envelopes can ride on a 2xx status; the envelope decides.
    let (base_url, rx) = spawn_api_server(vec![CannedResponse {
        status: 200,
        body: r#"{"ok":false,"error_code":409,"description":"Conflict: terminated by other getUpdates request"}"#.to_owned(),
    }]);
    let diagnostics = CollectingDiagnostics::new();

    let handler = builder(&base_url, &diagnostics).build().expect("build");

    assert!(handler.is_disabled());
    assert!(
        diagnostics
            .errors()
            .iter()
            .any(|message| message.contains("chat id resolution failed"))
    );

    handler.emit(&error_record("dropped"));
    rx.recv_timeout(Duration::from_secs(5))
        .expect("bootstrap request");
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[rstest]
#[case::no_updates("[]")]
#[case::update_without_message(r#"[{"update_id":5}]"#)]
fn bootstrap_without_usable_update_disables_handler(#[case] updates: &str) {
    let (base_url, _rx) = spawn_api_server(vec![CannedResponse::ok(updates)]);
    let diagnostics = CollectingDiagnostics::new();

    let handler = builder(&base_url, &diagnostics).build().expect("build");

    assert!(handler.is_disabled());
    assert!(
        diagnostics
            .errors()
            .iter()
            .any(|message| message.contains("configure chat_id"))
    );
}

#[test]
fn record_is_uploaded_as_document() {
    let (base_url, rx) = spawn_api_server(vec![CannedResponse::ok(MESSAGE_RESULT)]);
    let diagnostics = CollectingDiagnostics::new();
    let handler = builder(&base_url, &diagnostics)
        .with_chat_id(42)
        .build()
        .expect("build");

    handler.emit(&error_record("boom"));

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.path, "/bot123:abc/sendDocument");
    let content_type = captured.header("content-type").unwrap_or("");
    assert!(content_type.starts_with("multipart/form-data; boundary=telegram-handler-"));

    let parts = multipart_parts(&captured.body);
    assert_eq!(part(&parts, "chat_id").value, "42");
    assert!(parts.iter().all(|part| part.name != "disable_notification"));

    let document = part(&parts, "document");
    assert!(document.filename.as_deref().is_some_and(|f| f.ends_with(".html")));
    assert!(document.value.contains("<b>ERROR</b>"));
    assert!(document.value.contains("From app\nboom"));
    assert!(diagnostics.is_empty());
}

#[test]
fn notification_flag_rides_along_with_documents() {
    let (base_url, rx) = spawn_api_server(vec![CannedResponse::ok(MESSAGE_RESULT)]);
    let diagnostics = CollectingDiagnostics::new();
    let handler = builder(&base_url, &diagnostics)
        .with_chat_id(42)
        .with_disable_notification(true)
        .build()
        .expect("build");

    handler.emit(&error_record("quiet"));

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    let parts = multipart_parts(&captured.body);
    assert_eq!(part(&parts, "disable_notification").value, "true");
}

#[test]
fn username_chat_id_is_sent_verbatim() {
    let (base_url, rx) = spawn_api_server(vec![CannedResponse::ok(MESSAGE_RESULT)]);
    let diagnostics = CollectingDiagnostics::new();
    let handler = builder(&base_url, &diagnostics)
        .with_chat_id("@alerts")
        .build()
        .expect("build");

    handler.emit(&error_record("boom"));

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    let parts = multipart_parts(&captured.body);
    assert_eq!(part(&parts, "chat_id").value, "@alerts");
}

#[test]
fn rejected_delivery_is_reported_not_raised() {
    let (base_url, _rx) = spawn_api_server(vec![CannedResponse::rejection(
        400,
        "Bad Request: chat not found",
    )]);
    let diagnostics = CollectingDiagnostics::new();
    let handler = builder(&base_url, &diagnostics)
        .with_chat_id(42)
        .build()
        .expect("build");

    handler.emit(&error_record("boom"));

    assert!(
        diagnostics
            .warnings()
            .iter()
            .any(|message| {
                message.contains("record delivery rejected") && message.contains("chat not found")
            })
    );
    assert!(
        diagnostics
            .debugs()
            .iter()
            .any(|message| message.contains("delivery parameters") && message.contains("chat_id=42"))
    );
}

#[test]
fn transport_failure_is_reported_not_raised() {
    let diagnostics = CollectingDiagnostics::new();
    let handler = builder(&refused_endpoint(), &diagnostics)
        .with_chat_id(42)
        .build()
        .expect("build");

    handler.emit(&error_record("boom"));

    assert!(
        diagnostics
            .errors()
            .iter()
            .any(|message| message.contains("record delivery failed"))
    );
}

#[test]
fn oversized_record_is_truncated_before_upload() {
    let (base_url, rx) = spawn_api_server(vec![CannedResponse::ok(MESSAGE_RESULT)]);
    let diagnostics = CollectingDiagnostics::new();
    let handler = builder(&base_url, &diagnostics)
        .with_chat_id(42)
        .with_formatter(TextFormatter::new())
        .build()
        .expect("build");

    handler.emit(&error_record(&"a".repeat(MAX_MESSAGE_BYTES * 2)));

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    let parts = multipart_parts(&captured.body);
    let document = part(&parts, "document");
    assert_eq!(document.value.len(), MAX_MESSAGE_BYTES);
    assert!(document.value.ends_with("aaa"));
}

#[test]
fn record_at_the_exact_limit_uploads_whole() {
    let (base_url, rx) = spawn_api_server(vec![CannedResponse::ok(MESSAGE_RESULT)]);
    let diagnostics = CollectingDiagnostics::new();
    let handler = builder(&base_url, &diagnostics)
        .with_chat_id(42)
        .with_formatter(TextFormatter::new())
        .build()
        .expect("build");

    // The timestamp renders at a fixed width, so the envelope length holds
    // between this measurement and the emit below.
    let envelope = TextFormatter::new().format(&error_record("")).into_body();
    let message = "a".repeat(MAX_MESSAGE_BYTES - envelope.len());
    handler.emit(&error_record(&message));

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    let parts = multipart_parts(&captured.body);
    let document = part(&parts, "document");
    assert_eq!(document.value.len(), MAX_MESSAGE_BYTES);
    assert!(document.value.ends_with(&message));
}

#[test]
fn one_shared_formatter_serves_several_handlers() {
    let (base_url, rx) = spawn_api_server(vec![
        CannedResponse::ok(MESSAGE_RESULT),
        CannedResponse::ok(MESSAGE_RESULT),
    ]);
    let diagnostics = CollectingDiagnostics::new();
    let formatter: Arc<dyn Formatter + Send + Sync> = Arc::new(TextFormatter::new());
    let shared = SharedFormatter::from_arc(Arc::clone(&formatter));
    // clone_arc hands back the same formatter allocation.
    assert!(Arc::ptr_eq(&formatter, &shared.clone_arc()));

    let first = builder(&base_url, &diagnostics)
        .with_chat_id(42)
        .with_shared_formatter(shared.clone())
        .build()
        .expect("build");
    let second = builder(&base_url, &diagnostics)
        .with_chat_id(42)
        .with_shared_formatter(SharedFormatter::from_arc(shared.clone_arc()))
        .build()
        .expect("build");

    first.emit(&error_record("first"));
    second.emit(&error_record("second"));

    for expected in ["ERROR\n[app]\nfirst", "ERROR\n[app]\nsecond"] {
        let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
        let parts = multipart_parts(&captured.body);
        assert!(part(&parts, "document").value.ends_with(expected));
    }
}

#[test]
fn send_message_posts_plain_json() {
    let (base_url, rx) = spawn_api_server(vec![CannedResponse::ok(MESSAGE_RESULT)]);
    let diagnostics = CollectingDiagnostics::new();
    let handler = builder(&base_url, &diagnostics)
        .with_chat_id(42)
        .build()
        .expect("build");

    handler.send_message("deploy finished");

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(captured.path, "/bot123:abc/sendMessage");
    assert_eq!(captured.header("content-type"), Some("application/json"));
    let payload: serde_json::Value = serde_json::from_str(&captured.body).expect("json body");
    assert_eq!(payload["chat_id"], 42);
    assert_eq!(payload["text"], "deploy finished");
    assert!(payload.get("parse_mode").is_none());
    assert!(payload.get("disable_notification").is_none());
    assert!(diagnostics.is_empty());
}

#[test]
fn send_message_carries_configured_flags() {
    let (base_url, rx) = spawn_api_server(vec![CannedResponse::ok(MESSAGE_RESULT)]);
    let diagnostics = CollectingDiagnostics::new();
    let handler = builder(&base_url, &diagnostics)
        .with_chat_id(42)
        .with_disable_notification(true)
        .with_disable_web_page_preview(true)
        .build()
        .expect("build");

    handler.send_message("quiet link");

    let captured = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    let payload: serde_json::Value = serde_json::from_str(&captured.body).expect("json body");
    assert_eq!(payload["disable_notification"], true);
    assert_eq!(payload["disable_web_page_preview"], true);
}

#[test]
fn last_response_keeps_the_raw_body() {
    let (base_url, _rx) = spawn_api_server(vec![CannedResponse::ok(MESSAGE_RESULT)]);
    let diagnostics = CollectingDiagnostics::new();
    let handler = builder(&base_url, &diagnostics)
        .with_chat_id(42)
        .build()
        .expect("build");

    assert_eq!(handler.last_response(), None);
    handler.send_message("ping");
    assert_eq!(
        handler.last_response().as_deref(),
        Some(r#"{"ok":true,"result":{"message_id":5,"chat":{"id":42}}}"#)
    );
}

#[test]
fn records_below_threshold_never_reach_the_wire() {
    let (base_url, rx) = spawn_api_server(Vec::new());
    let diagnostics = CollectingDiagnostics::new();
    let handler = builder(&base_url, &diagnostics)
        .with_chat_id(42)
        .with_level(Level::Warn)
        .build()
        .expect("build");

    handler.emit(&LogRecord::new("app", Level::Info, "chatter"));

    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    assert!(diagnostics.is_empty());
}

#[test]
fn disabled_handler_ignores_send_message() {
    let (base_url, rx) = spawn_api_server(vec![CannedResponse::ok("[]")]);
    let diagnostics = CollectingDiagnostics::new();
    let handler = builder(&base_url, &diagnostics).build().expect("build");

    assert!(handler.is_disabled());
    handler.send_message("ignored");

    rx.recv_timeout(Duration::from_secs(5))
        .expect("bootstrap request");
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}
