extern crate goalstate_agent;
extern crate goalstate_protocol;
extern crate mockito;

use goalstate_agent::ReqwestTransport;
use goalstate_protocol::{HeaderKind, Transport};

#[test]
fn fetch_config_returns_body_on_success() {
    let _m = mockito::mock("GET", "/machine/?comp=goalstate")
        .with_status(200)
        .with_body("<GoalState><Incarnation>1</Incarnation></GoalState>")
        .create();

    let transport = ReqwestTransport::new(None);
    let uri = format!("{}/machine/?comp=goalstate", mockito::server_url());
    let body = transport.fetch_config(&uri, HeaderKind::Standard).unwrap();

    assert!(body.contains("<Incarnation>1</Incarnation>"));
}

#[test]
fn fetch_config_sends_agent_and_version_headers() {
    let _m = mockito::mock("GET", "/standard")
        .match_header("x-ms-agent-name", "WALinuxAgent")
        .match_header("x-ms-version", "2012-11-30")
        .with_status(200)
        .with_body("ok")
        .create();

    let transport = ReqwestTransport::new(None);
    let uri = format!("{}/standard", mockito::server_url());
    let body = transport.fetch_config(&uri, HeaderKind::Standard).unwrap();

    assert_eq!(body, "ok");
}

#[test]
fn fetch_config_with_cert_header_adds_cipher_and_cert_headers() {
    let _m = mockito::mock("GET", "/cert")
        .match_header("x-ms-cipher-name", "DES_EDE3_CBC")
        .match_header("x-ms-guest-agent-public-x509-cert", "Zm9v")
        .with_status(200)
        .with_body("ok")
        .create();

    let transport = ReqwestTransport::new(Some("Zm9v".to_string()));
    let uri = format!("{}/cert", mockito::server_url());
    let body = transport.fetch_config(&uri, HeaderKind::Cert).unwrap();

    assert_eq!(body, "ok");
}

#[test]
fn fetch_config_surfaces_non_success_status() {
    let _m = mockito::mock("GET", "/missing").with_status(404).create();

    let transport = ReqwestTransport::new(None);
    let uri = format!("{}/missing", mockito::server_url());
    let err = transport.fetch_config(&uri, HeaderKind::Standard).unwrap_err();

    assert!(err.to_string().contains("404"));
}
