// Integration tests for `HttpTransport` using wiremock.

use dnsrec_core::config::ProviderConfig;
use dnsrec_core::traits::{ApiRequest, Transport};
use dnsrec_core::{
    DomainId, Error, Record, RecordController, RecordId, RecordIdentity, RecordType, ResourceSpec,
};
use dnsrec_transport_http::HttpTransport;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HttpTransport) {
    let server = MockServer::start().await;
    let config = ProviderConfig::new("token", "secret").with_api_base(format!("{}/v0", server.uri()));
    let transport = HttpTransport::new(&config).unwrap();
    (server, transport)
}

fn www() -> Record {
    Record::new(RecordType::A, "www", "192.0.2.1", 300)
}

// ── Transport tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_sends_basic_auth_on_every_request() {
    let (server, transport) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v0/domains/42/dns/100"))
        .and(header("authorization", "Basic dG9rZW46c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let response = transport
        .execute(ApiRequest::get("/domains/42/dns/100"))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_posts_json_body() {
    let (server, transport) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v0/domains/42/dns"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"host": "www", "type": "A", "data": "192.0.2.1", "ttl": 300})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 100})))
        .expect(1)
        .mount(&server)
        .await;

    let response = transport
        .execute(ApiRequest::post("/domains/42/dns", www().to_wire().unwrap()))
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.body, br#"{"id":100}"#);
}

#[tokio::test]
async fn test_error_statuses_are_returned_not_raised() {
    let (server, transport) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v0/domains/42/dns/100"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Record not found"))
        .mount(&server)
        .await;

    let response = transport
        .execute(ApiRequest::delete("/domains/42/dns/100"))
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert_eq!(response.body, b"Record not found");
}

#[tokio::test]
async fn test_timeout_is_a_transport_error() {
    let server = MockServer::start().await;
    let config = ProviderConfig::new("token", "secret")
        .with_api_base(server.uri())
        .with_timeout_secs(1);
    let transport = HttpTransport::new(&config).unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let err = transport
        .execute(ApiRequest::get("/domains/1/dns/1"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Transport(ref msg) if msg.contains("timed out")),
        "expected timeout, got: {err:?}"
    );
}

#[tokio::test]
async fn test_unreachable_host_is_a_transport_error() {
    // Port 9 (discard) is closed on test hosts
    let config = ProviderConfig::new("token", "secret").with_api_base("http://127.0.0.1:9");
    let transport = HttpTransport::new(&config).unwrap();

    let err = transport
        .execute(ApiRequest::get("/domains"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
}

// ── Controller over HTTP ────────────────────────────────────────────

#[tokio::test]
async fn test_controller_lifecycle_over_http() {
    let (server, transport) = setup().await;
    let controller = RecordController::new(Box::new(transport));
    let domain = DomainId::new(42).unwrap();

    Mock::given(method("POST"))
        .and(path("/v0/domains/42/dns"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 100})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v0/domains/42/dns/100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 100, "host": "www", "type": "A", "data": "192.0.2.1", "ttl": 300
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v0/domains/42/dns/100"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let observed = controller
        .create(&ResourceSpec::new(domain, www()))
        .await
        .unwrap();
    assert_eq!(
        observed.identity,
        RecordIdentity::new(domain, RecordId::new(100).unwrap())
    );
    assert_eq!(observed.record, www());

    controller.delete(&observed.identity).await.unwrap();
}

#[tokio::test]
async fn test_controller_update_expects_204() {
    let (server, transport) = setup().await;
    let controller = RecordController::new(Box::new(transport));
    let identity = controller.import("42/100").unwrap();

    Mock::given(method("PUT"))
        .and(path("/v0/domains/42/dns/100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let desired = ResourceSpec::new(
        identity.domain_id,
        Record::new(RecordType::A, "www", "192.0.2.1", 60),
    );
    let err = controller
        .update(&identity, &www(), &desired)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(200));
}
