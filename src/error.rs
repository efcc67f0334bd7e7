//! Crate-level error type.
//!
//! Every fallible RPC operation funnels into [`RpcError`]. Lower layers
//! keep their own narrower enums (`CodecError`, `ParseError`,
//! `ConfigError`) and convert on the way up.

use std::time::Duration;

use crate::config::ConfigError;
use crate::protocol::Status;
use crate::rpc::codec::CodecError;
use crate::rpc::protocol::TypeError;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    #[error("transport: {0}")]
    Transport(#[from] std::io::Error),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("method '{method}' not found in protocol '{protocol}'")]
    MethodNotFound { protocol: String, method: String },

    #[error("protocol not found: {0}")]
    ProtocolNotFound(String),

    #[error("protocol already registered: {0}")]
    DuplicateProtocol(String),

    /// The remote handler failed; carries the unwrapped application error.
    #[error("{0}")]
    Application(anyhow::Error),

    #[error("dispatch: {0}")]
    Dispatch(String),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected message: {0}")]
    UnexpectedMessage(String),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

impl RpcError {
    /// The wire status behind an application error, if it was not upcast
    /// into something else.
    pub fn status(&self) -> Option<&Status> {
        match self {
            RpcError::Application(e) => e.downcast_ref::<Status>(),
            _ => None,
        }
    }
}
