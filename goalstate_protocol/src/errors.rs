//! Error taxonomy surfaced to callers.
//!
//! `IncompleteGoalStateError` and `ProtocolError` are fatal for a fetch
//! cycle. `ExtensionConfigError` is fatal for a single extension handler
//! only, callers catch it and stash it in that handler's
//! `invalid_setting_reason` rather than aborting the whole goal state.
//! `TransportError` and `CryptoError` are the error types the `Transport`
//! and `Crypto` trait contracts return.

use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};

/// Raised when the root document can't be fetched with a `RoleInstance`
/// node after the retry budget is exhausted.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
#[fail(display = "fetched goal state without a RoleInstance after {} attempts [incarnation {}]", attempts, incarnation)]
pub struct IncompleteGoalStateError {
    pub attempts: u32,
    pub incarnation: String,
}

/// Raised when any other step of the fetch-and-materialize pipeline fails;
/// wraps the underlying cause.
#[derive(Debug)]
pub struct ProtocolError {
    inner: Context<String>,
}

impl ProtocolError {
    pub fn new<S: Into<String>>(msg: S) -> Self {
        ProtocolError { inner: Context::new(msg.into()) }
    }
}

impl Fail for ProtocolError {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl From<Context<String>> for ProtocolError {
    fn from(inner: Context<String>) -> ProtocolError {
        ProtocolError { inner }
    }
}

/// Raised while parsing a single `Plugin`/`PluginSettings` pair. The caller
/// (`ExtensionsConfig`) always recovers from this: the handler is retained
/// with this error's message recorded as `invalid_setting_reason`.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
#[fail(display = "{}", _0)]
pub struct ExtensionConfigError(pub String);

impl ExtensionConfigError {
    pub fn new<S: Into<String>>(msg: S) -> Self {
        ExtensionConfigError(msg.into())
    }
}

/// Raised by a `Transport` implementation on I/O failure or a non-2xx
/// response.
#[derive(Debug)]
pub struct TransportError {
    inner: Context<TErrKind>,
}

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum TErrKind {
    #[fail(display = "could not reach '{}'", _0)]
    Unreachable(String),

    #[fail(display = "unexpected HTTP status {} from '{}'", _0, _1)]
    UnexpectedStatus(u16, String),
}

impl Fail for TransportError {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl From<TErrKind> for TransportError {
    fn from(kind: TErrKind) -> TransportError {
        TransportError { inner: Context::new(kind) }
    }
}

impl From<Context<TErrKind>> for TransportError {
    fn from(inner: Context<TErrKind>) -> TransportError {
        TransportError { inner }
    }
}

/// Raised by a `Crypto` implementation.
#[derive(Debug)]
pub struct CryptoError {
    inner: Context<CErrKind>,
}

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum CErrKind {
    #[fail(display = "failed to decrypt p7m blob at '{}'", _0)]
    Decrypt(String),

    #[fail(display = "failed to extract public key from '{}'", _0)]
    Pubkey(String),

    #[fail(display = "failed to compute thumbprint from '{}'", _0)]
    Thumbprint(String),
}

impl Fail for CryptoError {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl From<CErrKind> for CryptoError {
    fn from(kind: CErrKind) -> CryptoError {
        CryptoError { inner: Context::new(kind) }
    }
}

impl From<Context<CErrKind>> for CryptoError {
    fn from(inner: Context<CErrKind>) -> CryptoError {
        CryptoError { inner }
    }
}
