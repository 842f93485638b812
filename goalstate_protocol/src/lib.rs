#![allow(non_snake_case)]

#[macro_use]
extern crate serde_derive;
extern crate serde;
extern crate serde_json;

#[macro_use]
extern crate log;

extern crate regex;
extern crate roxmltree;

#[macro_use]
extern crate failure;

pub use failure::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Null-safe XML cursor helpers; the only XML primitives used elsewhere in this crate.
pub mod xmlutil;

/// Error taxonomy surfaced to callers of this crate.
pub mod errors;
pub use errors::{CryptoError, ExtensionConfigError, ProtocolError, TransportError};

/// The `Transport` contract: authenticated fetch of a configuration document.
pub mod transport;
pub use transport::{HeaderKind, Transport};

/// The `Crypto` contract: p7m decryption and public-key/thumbprint extraction.
pub mod crypto;
pub use crypto::Crypto;

/// Injectable wall-clock sleep, so the root-fetch retry loop is testable.
pub mod clock;
pub use clock::{Clock, SystemClock};

/// The process-wide container-id register updated by the root fetcher.
pub mod container;
pub use container::ContainerIdRegister;

/// Small data types shared across the parsers.
pub mod structs;

pub mod hosting_env;
pub use hosting_env::HostingEnv;

pub mod shared_config;
pub use shared_config::SharedConfig;

pub mod certificates;
pub use certificates::Certificates;

pub mod extensions_config;
pub use extensions_config::ExtensionsConfig;

pub mod remote_access;
pub use remote_access::RemoteAccess;

/// The root goal-state document and the orchestrator that completes it.
pub mod goal_state;
pub use goal_state::{fetch_goal_state, GoalState};
