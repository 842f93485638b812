//! The `Transport` contract: authenticated fetch of a URI.
//!
//! The concrete implementation (over `reqwest`) lives in the agent binary
//! crate; nothing in here knows about HTTP. Parsers never call `Transport`
//! directly, only the root fetcher and the orchestrator do.

use crate::errors::TransportError;

/// Which header convention to use for a given URI. `Cert` is used for the
/// `Certificates` and `RemoteAccessInfo` subdocuments; everything else uses
/// `Standard`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderKind {
    Standard,
    Cert,
}

pub trait Transport {
    /// Fetch `uri` and return the response body as text.
    fn fetch_config(&self, uri: &str, header: HeaderKind) -> Result<String, TransportError>;
}
