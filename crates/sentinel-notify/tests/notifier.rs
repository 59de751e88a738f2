//! Integration tests for `TelegramNotifier` using wiremock HTTP mocks.

use sentinel_notify::{NotifyError, TelegramNotifier};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_notifier(base_url: &str) -> TelegramNotifier {
    TelegramNotifier::with_base_url("123:test-token", "-1001234", 5, base_url)
        .expect("notifier construction should not fail")
}

#[tokio::test]
async fn send_posts_form_to_send_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:test-token/sendMessage"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("chat_id=-1001234"))
        .and(body_string_contains("parse_mode=Markdown"))
        .and(body_string_contains("disable_web_page_preview=true"))
        .and(body_string_contains("text=hello+world"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"ok": true, "result": {"message_id": 1}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    test_notifier(&server.uri())
        .send("hello world")
        .await
        .expect("send should succeed");
}

#[tokio::test]
async fn rejected_message_surfaces_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: can't parse entities"
        })))
        .mount(&server)
        .await;

    let err = test_notifier(&server.uri()).send("*broken").await.unwrap_err();
    match err {
        NotifyError::Api {
            status,
            description,
        } => {
            assert_eq!(status, 400);
            assert!(description.contains("can't parse entities"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn ok_false_with_success_status_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"ok": false, "description": "chat not found"})),
        )
        .mount(&server)
        .await;

    let result = test_notifier(&server.uri()).send("x").await;
    assert!(matches!(result, Err(NotifyError::Api { status: 200, .. })));
}

#[tokio::test]
async fn non_json_error_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_notifier(&server.uri()).send("x").await.unwrap_err();
    assert!(err.to_string().contains("Bad Gateway"));
}

#[tokio::test]
async fn unreachable_server_is_http_error_without_token() {
    // nothing listens on port 9 (discard) in the test environment
    let err = test_notifier("http://127.0.0.1:9").send("x").await.unwrap_err();
    assert!(matches!(err, NotifyError::Http(_)));
    assert!(!err.to_string().contains("test-token"));
}
