//! RPC server: dispatches incoming messages to registered protocols.
//!
//! **Transport-decoupled**: the server does not own a transport. Callers
//! either hand it decoded payloads via [`Server::handle_payload`] (and get
//! the encoded reply back) or let [`Server::serve`] drive a blocking
//! transport until the peer hangs up.
//!
//! Every message takes one of four paths:
//!
//! 1. **Call**: look up `protocol.method`, decode the argument record,
//!    run the handler, reply with `[1, seqno, error, result]`.
//! 2. **Notify**: same lookup and decode, no reply. Failures are logged.
//! 3. **Cancel**: logged and ignored; handlers run to completion.
//! 4. **Response**: a server never issues calls, so it is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info, warn};
use rmpv::Value;

use super::codec::{FrameDecoder, encode_frame};
use super::message::{RpcMessage, to_value};
use super::protocol::{CallContext, DispatchError, Protocol, split_method_name};
use super::transport::Transport;
use crate::config::RpcConfig;
use crate::error::RpcError;
use crate::protocol::{HandlerError, Status, wrap_error};

/// Hook turning a handler failure into the wire status.
pub type WrapErrorFn = fn(Option<&HandlerError>) -> Option<Status>;

/// Protocol registry plus dispatcher.
pub struct Server {
    protocols: HashMap<String, Protocol>,
    wrap_error: WrapErrorFn,
    config: RpcConfig,
    next_conn_id: AtomicU64,
}

impl Server {
    pub fn new(config: RpcConfig) -> Self {
        Self {
            protocols: HashMap::new(),
            wrap_error,
            config,
            next_conn_id: AtomicU64::new(1),
        }
    }

    /// Replace the default error-to-status conversion.
    #[must_use]
    pub fn with_wrap_error(mut self, f: WrapErrorFn) -> Self {
        self.wrap_error = f;
        self
    }

    pub fn register(&mut self, protocol: Protocol) -> Result<(), RpcError> {
        if self.protocols.contains_key(&protocol.name) {
            return Err(RpcError::DuplicateProtocol(protocol.name));
        }
        info!(
            "RPC: registered {} ({} methods)",
            protocol.name,
            protocol.methods.len()
        );
        self.protocols.insert(protocol.name.clone(), protocol);
        Ok(())
    }

    pub fn protocol_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.protocols.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Allocate an id for a new connection; used in log lines and
    /// [`CallContext`].
    pub fn next_connection_id(&self) -> u64 {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Decode one payload, dispatch it and encode the reply (if any).
    pub fn handle_payload(&self, conn_id: u64, payload: &[u8]) -> Result<Option<Vec<u8>>, RpcError> {
        let msg = RpcMessage::decode(payload)?;
        match self.dispatch(conn_id, msg) {
            Some(reply) => Ok(Some(reply.encode()?)),
            None => Ok(None),
        }
    }

    /// Dispatch a decoded message. Returns the reply for calls.
    pub fn dispatch(&self, conn_id: u64, msg: RpcMessage) -> Option<RpcMessage> {
        match msg {
            RpcMessage::Call { seqno, method, arg } => {
                debug!("RPC[{}]: call #{} {}", conn_id, seqno, method);
                let ctx = CallContext::new(conn_id, Some(seqno), method);
                let (error, result) = match self.invoke(&ctx, arg) {
                    Ok(result) => (Value::Nil, result),
                    Err(e) => (self.error_value(conn_id, &ctx, e), Value::Nil),
                };
                Some(RpcMessage::Response {
                    seqno,
                    error,
                    result,
                })
            }
            RpcMessage::Notify { method, arg } => {
                debug!("RPC[{}]: notify {}", conn_id, method);
                let ctx = CallContext::new(conn_id, None, method);
                if let Err(e) = self.invoke(&ctx, arg) {
                    let status = self.to_status(e);
                    warn!(
                        "RPC[{}]: notify {} failed: {}",
                        conn_id,
                        ctx.method,
                        status.map(|s| s.desc).unwrap_or_default()
                    );
                }
                None
            }
            RpcMessage::Cancel { seqno, method } => {
                info!("RPC[{}]: cancel #{} {} ignored", conn_id, seqno, method);
                None
            }
            RpcMessage::Response { seqno, .. } => {
                warn!("RPC[{}]: dropping unsolicited response #{}", conn_id, seqno);
                None
            }
        }
    }

    fn invoke(&self, ctx: &CallContext, arg: Value) -> Result<Value, DispatchError> {
        let not_found = |protocol: &str, method: &str| {
            DispatchError::Handler(HandlerError::Other(anyhow::Error::new(
                RpcError::MethodNotFound {
                    protocol: protocol.to_owned(),
                    method: method.to_owned(),
                },
            )))
        };

        let Some((proto_name, method)) = split_method_name(&ctx.method) else {
            return Err(not_found("", &ctx.method));
        };
        let Some(protocol) = self.protocols.get(proto_name) else {
            return Err(DispatchError::Handler(HandlerError::Other(anyhow::Error::new(
                RpcError::ProtocolNotFound(proto_name.to_owned()),
            ))));
        };
        let Some(desc) = protocol.lookup(method) else {
            return Err(not_found(proto_name, method));
        };
        desc.invoke(ctx, arg)
    }

    fn to_status(&self, e: DispatchError) -> Option<Status> {
        let he = match e {
            DispatchError::Handler(he) => he,
            DispatchError::Type(te) => HandlerError::Other(anyhow::Error::new(te)),
        };
        (self.wrap_error)(Some(&he))
    }

    fn error_value(&self, conn_id: u64, ctx: &CallContext, e: DispatchError) -> Value {
        let Some(status) = self.to_status(e) else {
            return Value::Nil;
        };
        debug!(
            "RPC[{}]: {} returned {}/{}",
            conn_id, ctx.method, status.name, status.code
        );
        to_value(&status).unwrap_or_else(|err| {
            warn!("RPC[{}]: could not encode status: {}", conn_id, err);
            Value::Nil
        })
    }

    /// Serve one connection until the peer closes it.
    ///
    /// Framing errors end the connection: after a bad length prefix the
    /// stream is no longer aligned.
    pub fn serve<T: Transport>(&self, transport: &mut T) -> Result<(), RpcError> {
        let conn_id = self.next_connection_id();
        let mut decoder = FrameDecoder::new(self.config.max_frame_size);
        let mut buf = vec![0u8; self.config.read_buffer_size];
        info!("RPC[{}]: connection opened", conn_id);

        loop {
            let n = transport.read(&mut buf)?;
            if n == 0 {
                info!("RPC[{}]: connection closed by peer", conn_id);
                return Ok(());
            }
            decoder.feed(&buf[..n]);

            while let Some(frame) = decoder.next_frame()? {
                let reply = match self.handle_payload(conn_id, &frame) {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!("RPC[{}]: closing on bad message: {}", conn_id, e);
                        return Err(e);
                    }
                };
                if let Some(payload) = reply {
                    transport.write_all(&encode_frame(&payload, self.config.max_frame_size)?)?;
                    transport.flush()?;
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────
