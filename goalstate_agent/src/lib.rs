//! Ambient stack for the goal-state agent binary: concrete `Transport` and
//! `Crypto` implementations over `reqwest` and `openssl`, plus the startup
//! plumbing the CLI needs before it can make an HTTPS request.

extern crate goalstate_protocol;

extern crate reqwest;

extern crate openssl;
extern crate openssl_probe;

extern crate base64;

#[macro_use]
extern crate failure;

#[macro_use]
extern crate log;

pub use failure::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// A blocking `reqwest`-backed implementation of `goalstate_protocol::Transport`.
pub mod transport_http;
pub use transport_http::ReqwestTransport;

/// An `openssl`-backed implementation of `goalstate_protocol::Crypto`.
pub mod crypto_openssl;
pub use crypto_openssl::OpensslCrypto;

/// Prerequisite for any HTTPS client on this host: point OpenSSL at the
/// platform's CA bundle before the first request goes out.
pub fn init() {
    openssl_probe::init_ssl_cert_env_vars();
}
