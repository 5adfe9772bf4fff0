//! Contract Test: Import
//!
//! Verifies that caller-supplied `{domainId}/{recordId}` text becomes an
//! identity without touching the API, and that the identity addresses the
//! right record once read.

mod common;

use common::*;
use dnsrec_core::traits::Method;
use dnsrec_core::{Error, RecordController};

#[tokio::test]
async fn import_then_read_addresses_the_record() {
    let transport = ScriptedTransport::new();
    let controller =
        RecordController::new(Box::new(ScriptedTransport::sharing_counters_with(&transport)));

    let identity = controller.import("42/100").unwrap();
    assert_eq!(transport.request_count(), 0, "import must not call the API");
    assert_eq!(identity.handle(), "/domains/42/dns/100");
    assert_eq!(identity.composite(), "42/100");

    let reported = a_record(300).record;
    transport.respond(200, record_body(100, &reported));
    let record = controller.read(&identity).await.unwrap();

    assert_eq!(record, reported);
    let requests = transport.requests();
    assert_eq!(requests[0].method, Method::Get);
    assert_eq!(requests[0].path, "/domains/42/dns/100");
}

#[test]
fn malformed_import_text_is_a_parse_error() {
    let controller = RecordController::new(Box::new(ScriptedTransport::new()));

    for input in ["", "42", "42/", "/100", "abc/100", "42/xyz", "0/100", "42/0", "-1/5", "42/100/7"] {
        let err = controller.import(input).unwrap_err();
        match err {
            Error::Parse { input: ref got, .. } => assert_eq!(got, input),
            other => panic!("expected Parse for {input:?}, got {other:?}"),
        }
    }
}

#[test]
fn import_text_round_trips_through_identity() {
    let controller = RecordController::new(Box::new(ScriptedTransport::new()));
    let identity = controller.import("7/9001").unwrap();

    assert_eq!(controller.import(&identity.composite()).unwrap(), identity);
}
