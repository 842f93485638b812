//! A blocking `reqwest` implementation of the `Transport` façade.

use goalstate_protocol::errors::TErrKind;
use goalstate_protocol::{HeaderKind, Transport, TransportError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;

const AGENT_NAME: &str = "WALinuxAgent";
const WIRE_PROTOCOL_VERSION: &str = "2012-11-30";

/// Wire-server client. Holds the transport certificate (base64, no PEM
/// markers) needed for the `Cert` header variant, since the wire server
/// expects it on every certificate-bearing request rather than just once.
pub struct ReqwestTransport {
    client: Client,
    transport_cert_base64: Option<String>,
}

impl ReqwestTransport {
    pub fn new(transport_cert_base64: Option<String>) -> ReqwestTransport {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        ReqwestTransport { client, transport_cert_base64 }
    }

    fn headers(&self, header: HeaderKind) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-ms-agent-name"), HeaderValue::from_static(AGENT_NAME));
        headers.insert(HeaderName::from_static("x-ms-version"), HeaderValue::from_static(WIRE_PROTOCOL_VERSION));

        if header == HeaderKind::Cert {
            headers.insert(HeaderName::from_static("x-ms-cipher-name"), HeaderValue::from_static("DES_EDE3_CBC"));
            if let Some(cert) = &self.transport_cert_base64 {
                if let Ok(value) = HeaderValue::from_str(cert) {
                    headers.insert(HeaderName::from_static("x-ms-guest-agent-public-x509-cert"), value);
                }
            }
        }

        headers
    }
}

impl Transport for ReqwestTransport {
    fn fetch_config(&self, uri: &str, header: HeaderKind) -> Result<String, TransportError> {
        let headers = self.headers(header);

        let mut response = match self.client.get(uri).headers(headers).send() {
            Ok(r) => r,
            Err(e) => return Err(TErrKind::Unreachable(format!("{}: {}", uri, e)).into()),
        };

        if !response.status().is_success() {
            return Err(TErrKind::UnexpectedStatus(response.status().as_u16(), uri.to_string()).into());
        }

        response.text().map_err(|e| TErrKind::Unreachable(format!("{}: {}", uri, e)).into())
    }
}
