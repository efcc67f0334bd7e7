//! Client side: the generic call interface the protocol stubs use, plus
//! an in-process client wired straight into a [`Server`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use log::debug;
use rmpv::Value;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::engine::Server;
use super::message::{RpcMessage, SeqNumber, from_value, to_value};
use crate::error::RpcError;
use crate::protocol::ErrorUnwrapper;

/// Untyped RPC client. `arg` is the single argument record.
pub trait GenericClient: Send + Sync {
    fn call(&self, method: &str, arg: Value, timeout: Option<Duration>) -> Result<Value, RpcError>;

    fn notify(&self, method: &str, arg: Value, timeout: Option<Duration>) -> Result<(), RpcError>;
}

impl<C: GenericClient + ?Sized> GenericClient for Arc<C> {
    fn call(&self, method: &str, arg: Value, timeout: Option<Duration>) -> Result<Value, RpcError> {
        (**self).call(method, arg, timeout)
    }

    fn notify(&self, method: &str, arg: Value, timeout: Option<Duration>) -> Result<(), RpcError> {
        (**self).notify(method, arg, timeout)
    }
}

impl<C: GenericClient + ?Sized> GenericClient for &C {
    fn call(&self, method: &str, arg: Value, timeout: Option<Duration>) -> Result<Value, RpcError> {
        (**self).call(method, arg, timeout)
    }

    fn notify(&self, method: &str, arg: Value, timeout: Option<Duration>) -> Result<(), RpcError> {
        (**self).notify(method, arg, timeout)
    }
}

/// Marshal `arg`, call, and decode the result into `R`.
pub fn call_typed<C, A, R>(
    cli: &C,
    method: &str,
    arg: &A,
    timeout: Option<Duration>,
) -> Result<R, RpcError>
where
    C: GenericClient + ?Sized,
    A: Serialize,
    R: DeserializeOwned,
{
    let res = cli.call(method, to_value(arg)?, timeout)?;
    Ok(from_value(&res)?)
}

pub fn notify_typed<C, A>(
    cli: &C,
    method: &str,
    arg: &A,
    timeout: Option<Duration>,
) -> Result<(), RpcError>
where
    C: GenericClient + ?Sized,
    A: Serialize,
{
    cli.notify(method, to_value(arg)?, timeout)
}

/// Check a response against the call it answers and pull out the result.
pub(crate) fn finish_call(
    unwrapper: &ErrorUnwrapper,
    want: SeqNumber,
    reply: RpcMessage,
) -> Result<Value, RpcError> {
    match reply {
        RpcMessage::Response {
            seqno,
            error,
            result,
        } if seqno == want => match unwrapper.unwrap_error(&error)? {
            Some(app) => Err(RpcError::Application(app)),
            None => Ok(result),
        },
        other => Err(RpcError::UnexpectedMessage(format!(
            "{} while waiting for response #{}",
            other.kind(),
            want
        ))),
    }
}

/// Client that hands every message straight to an in-process server.
///
/// Messages still go through the msgpack encoder and decoder, so the
/// wire shape is exercised end to end without a socket.
pub struct LocalClient {
    server: Arc<Server>,
    connection_id: u64,
    seqno: AtomicU32,
    unwrapper: ErrorUnwrapper,
}

impl LocalClient {
    pub fn new(server: Arc<Server>) -> Self {
        let connection_id = server.next_connection_id();
        Self {
            server,
            connection_id,
            seqno: AtomicU32::new(0),
            unwrapper: ErrorUnwrapper::new(),
        }
    }

    #[must_use]
    pub fn with_unwrapper(mut self, unwrapper: ErrorUnwrapper) -> Self {
        self.unwrapper = unwrapper;
        self
    }

    fn round_trip(&self, msg: &RpcMessage) -> Result<Option<RpcMessage>, RpcError> {
        let payload = msg.encode()?;
        match self.server.handle_payload(self.connection_id, &payload)? {
            Some(reply) => Ok(Some(RpcMessage::decode(&reply)?)),
            None => Ok(None),
        }
    }
}

impl GenericClient for LocalClient {
    fn call(&self, method: &str, arg: Value, _timeout: Option<Duration>) -> Result<Value, RpcError> {
        let seqno = self.seqno.fetch_add(1, Ordering::Relaxed);
        debug!("RPC[{}]: local call #{} {}", self.connection_id, seqno, method);
        let msg = RpcMessage::Call {
            seqno,
            method: method.to_owned(),
            arg,
        };
        let reply = self.round_trip(&msg)?.ok_or(RpcError::ConnectionClosed)?;
        finish_call(&self.unwrapper, seqno, reply)
    }

    fn notify(&self, method: &str, arg: Value, _timeout: Option<Duration>) -> Result<(), RpcError> {
        let msg = RpcMessage::Notify {
            method: method.to_owned(),
            arg,
        };
        match self.round_trip(&msg)? {
            None => Ok(()),
            Some(other) => Err(RpcError::UnexpectedMessage(format!(
                "{} in reply to a notification",
                other.kind()
            ))),
        }
    }
}
