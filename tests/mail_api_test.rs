//! Wiremock tests for the HTTP mail-relay adapter.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use saldo::adapters::MailApiClient;
use saldo::error::SendError;
use saldo::traits::Mailer;

#[tokio::test]
async fn test_send_posts_message_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(header("Authorization", "Bearer relay-token"))
        .and(body_partial_json(json!({
            "from": "noreply@saldo.test",
            "to": "a@x.com",
            "subject": "Saldo notification",
            "text": "hello"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mailer = MailApiClient::new(
        format!("{}/send", server.uri()),
        "relay-token",
        "noreply@saldo.test",
    );
    mailer
        .send("a@x.com", "Saldo notification", "hello")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rejected_send_surfaces_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .mount(&server)
        .await;

    let mailer = MailApiClient::new(format!("{}/send", server.uri()), "wrong", "noreply@saldo.test");
    let err = mailer.send("a@x.com", "s", "b").await.unwrap_err();
    assert_eq!(
        err,
        SendError::Relay {
            status: 401,
            message: "bad token".to_string()
        }
    );
}

#[tokio::test]
async fn test_unreachable_relay_is_transport_error() {
    let mailer = MailApiClient::new("http://127.0.0.1:1/send", "token", "noreply@saldo.test");
    let err = mailer.send("a@x.com", "s", "b").await.unwrap_err();
    assert!(matches!(err, SendError::Transport(_)));
}
