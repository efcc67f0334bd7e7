//! Keybase `keybase.1` protocol bindings.
//!
//! `protocol` holds the typed data model, identifier helpers, the status
//! bridge and one module per bundled protocol. `rpc` is the framed
//! msgpack-RPC layer those bindings are served and called through.

#![deny(unused_must_use)]

pub mod config;
pub mod logging;
pub mod protocol;
pub mod rpc;

mod error;

pub use config::{ConfigError, RpcConfig};
pub use error::RpcError;
