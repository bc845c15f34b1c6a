use std::time::Duration;

use exchange_core::{RecordId, ReplyRequest, StatusCode, StatusRequest};
use exchange_engine::{FailureKind, ReqwestTransport, Transport, TransportSettings};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> TransportSettings {
    TransportSettings {
        reply_url: format!("{}/reply", server.uri()),
        status_url: format!("{}/status", server.uri()),
        token: "s3cret".to_string(),
        ..TransportSettings::default()
    }
}

#[tokio::test]
async fn reply_posts_id_message_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/reply"))
        .and(body_string_contains("id=42"))
        .and(body_string_contains("msg=hello+there"))
        .and(body_string_contains("token=s3cret"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"sms": "hello there!", "status": "sent"}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(settings(&server)).expect("client");
    let ack = transport
        .post_reply(&ReplyRequest {
            id: 42,
            msg: "hello there".to_string(),
        })
        .await
        .expect("reply ok");

    assert_eq!(ack.sms, "hello there!");
    assert_eq!(ack.status, StatusCode::new("sent"));
}

#[tokio::test]
async fn status_post_reads_status_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/status"))
        .and(body_string_contains("status=received"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status": "good"}"#))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(settings(&server)).expect("client");
    let ack = transport
        .post_status(&StatusRequest {
            id: 3,
            status: StatusCode::new("received"),
        })
        .await
        .expect("status ok");

    assert_eq!(ack.status, StatusCode::new("good"));
}

#[tokio::test]
async fn poll_sends_since_id_and_parses_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/poll"))
        .and(query_param("id", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"id": 12, "status": "pending", "details": "", "message": "new",
                 "responses": [], "name": "Ali", "dateStr": "now"},
                {"id": "11", "message": "older"}]"#,
        ))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(settings(&server)).expect("client");
    let url = format!("{}/poll", server.uri());
    let records = transport.fetch_newer(&url, 10).await.expect("poll ok");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, RecordId::Number(12));
    assert_eq!(records[0].name, "Ali");
    assert_eq!(records[1].id, RecordId::Text("11".to_string()));
    assert!(records[1].responses.is_empty());
}

#[tokio::test]
async fn http_errors_are_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/poll"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(settings(&server)).expect("client");
    let url = format!("{}/poll", server.uri());
    let err = transport.fetch_newer(&url, 0).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn undecodable_reply_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/reply"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(settings(&server)).expect("client");
    let err = transport
        .post_reply(&ReplyRequest {
            id: 1,
            msg: "x".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn oversized_poll_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/poll"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[".repeat(64)))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings {
        max_bytes: 16,
        ..settings(&server)
    })
    .expect("client");
    let url = format!("{}/poll", server.uri());
    let err = transport.fetch_newer(&url, 0).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 16, .. }));
}

#[tokio::test]
async fn optional_timeout_applies_when_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/poll"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("[]"),
        )
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(TransportSettings {
        request_timeout: Some(Duration::from_millis(50)),
        ..settings(&server)
    })
    .expect("client");
    let url = format!("{}/poll", server.uri());
    let err = transport.fetch_newer(&url, 0).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn missing_endpoint_is_not_configured() {
    let transport = ReqwestTransport::new(TransportSettings::default()).expect("client");
    let err = transport
        .post_reply(&ReplyRequest {
            id: 1,
            msg: "x".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::NotConfigured);
}
