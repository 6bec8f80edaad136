//! Integration tests for the Telegram notifier using wiremock HTTP mocks.

use tikwatch_notify::{NotifyError, Notifier};
use tikwatch_profile::{Count, ProfileRecord};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_notifier(base_url: &str) -> Notifier {
    Notifier::with_base_url("123:abc", 10, base_url).expect("notifier construction")
}

fn record(avatar: Option<&str>) -> ProfileRecord {
    ProfileRecord {
        username: "khangdino206".to_string(),
        nickname: "K".to_string(),
        region: "VN".to_string(),
        follower_count: Count::Exact(1234),
        following_count: Count::Exact(10),
        bio: "hi".to_string(),
        is_private: false,
        avatar_url: avatar.map(str::to_string),
    }
}

#[tokio::test]
async fn send_message_posts_html_body_to_token_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(serde_json::json!({
            "chat_id": 42,
            "text": "hello",
            "parse_mode": "HTML"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = test_notifier(&server.uri());
    notifier
        .send_message(42, "hello", None)
        .await
        .expect("send should succeed");
}

#[tokio::test]
async fn telegram_level_rejection_surfaces_description() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": false,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let notifier = test_notifier(&server.uri());
    let err = notifier.send_message(42, "hello", None).await.unwrap_err();

    match err {
        NotifyError::Api { description } => {
            assert_eq!(description, "Bad Request: chat not found");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn non_2xx_without_description_maps_to_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let notifier = test_notifier(&server.uri());
    let err = notifier.send_message(42, "hello", None).await.unwrap_err();

    assert!(
        matches!(err, NotifyError::Status { status: 502 }),
        "expected Status(502), got: {err:?}"
    );
}

#[tokio::test]
async fn deliver_profile_with_avatar_uses_send_photo() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendPhoto"))
        .and(body_partial_json(serde_json::json!({
            "chat_id": 7,
            "photo": "http://x/a.jpg"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = test_notifier(&server.uri());
    notifier
        .deliver_profile(7, &record(Some("http://x/a.jpg")))
        .await
        .expect("photo delivery should succeed");
}

#[tokio::test]
async fn deliver_profile_without_avatar_falls_back_to_send_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = test_notifier(&server.uri());
    notifier
        .deliver_profile(7, &record(None))
        .await
        .expect("message delivery should succeed");
}
