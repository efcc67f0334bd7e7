//! Blocking client connection over any [`Transport`].
//!
//! One call is in flight at a time: the transport, decoder and read
//! buffer sit behind a single mutex that a call holds from write until
//! its response arrives. Messages that are not the awaited response
//! (server notifications, stale replies after a timeout) are skipped.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use log::{debug, warn};
use rmpv::Value;

use super::client::{GenericClient, finish_call};
use super::codec::{FrameDecoder, encode_frame};
use super::message::{RpcMessage, SeqNumber};
use super::transport::{Transport, is_timeout};
use crate::config::RpcConfig;
use crate::error::RpcError;
use crate::protocol::ErrorUnwrapper;

struct Inner<T> {
    transport: T,
    decoder: FrameDecoder,
    buf: Vec<u8>,
}

pub struct Connection<T> {
    inner: Mutex<Inner<T>>,
    seqno: AtomicU32,
    unwrapper: ErrorUnwrapper,
    max_frame_size: usize,
    default_timeout: Option<Duration>,
}

impl<T: Transport> Connection<T> {
    pub fn new(transport: T, config: &RpcConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                transport,
                decoder: FrameDecoder::new(config.max_frame_size),
                buf: vec![0u8; config.read_buffer_size],
            }),
            seqno: AtomicU32::new(0),
            unwrapper: ErrorUnwrapper::new(),
            max_frame_size: config.max_frame_size,
            default_timeout: config.call_timeout(),
        }
    }

    #[must_use]
    pub fn with_unwrapper(mut self, unwrapper: ErrorUnwrapper) -> Self {
        self.unwrapper = unwrapper;
        self
    }

    fn alloc_seqno(&self) -> SeqNumber {
        self.seqno.fetch_add(1, Ordering::Relaxed)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner<T>>, RpcError> {
        self.inner
            .lock()
            .map_err(|_| RpcError::Dispatch("connection lock poisoned".into()))
    }

    fn send(&self, inner: &mut Inner<T>, msg: &RpcMessage) -> Result<(), RpcError> {
        let frame = encode_frame(&msg.encode()?, self.max_frame_size)?;
        inner.transport.write_all(&frame)?;
        inner.transport.flush()?;
        Ok(())
    }

    /// Read until the response for `seqno` arrives.
    fn await_response(
        &self,
        inner: &mut Inner<T>,
        seqno: SeqNumber,
        timeout: Option<Duration>,
    ) -> Result<RpcMessage, RpcError> {
        inner.transport.set_read_timeout(timeout)?;
        loop {
            while let Some(frame) = inner.decoder.next_frame()? {
                match RpcMessage::decode(&frame)? {
                    RpcMessage::Response { seqno: got, .. } if got != seqno => {
                        warn!("RPC: dropping stale response #{} (want #{})", got, seqno);
                    }
                    reply @ RpcMessage::Response { .. } => return Ok(reply),
                    other => debug!("RPC: skipping {} while waiting for #{}", other.kind(), seqno),
                }
            }

            let n = match inner.transport.read(&mut inner.buf) {
                Ok(0) => return Err(RpcError::ConnectionClosed),
                Ok(n) => n,
                Err(e) if is_timeout(&e) => {
                    return Err(RpcError::Timeout(timeout.unwrap_or_default()));
                }
                Err(e) => return Err(e.into()),
            };
            inner.decoder.feed(&inner.buf[..n]);
        }
    }
}

impl<T: Transport> GenericClient for Connection<T> {
    fn call(&self, method: &str, arg: Value, timeout: Option<Duration>) -> Result<Value, RpcError> {
        let timeout = timeout.or(self.default_timeout);
        let seqno = self.alloc_seqno();
        let mut inner = self.lock()?;

        debug!("RPC: call #{} {}", seqno, method);
        self.send(
            &mut inner,
            &RpcMessage::Call {
                seqno,
                method: method.to_owned(),
                arg,
            },
        )?;
        let reply = self.await_response(&mut inner, seqno, timeout)?;
        finish_call(&self.unwrapper, seqno, reply)
    }

    fn notify(&self, method: &str, arg: Value, _timeout: Option<Duration>) -> Result<(), RpcError> {
        let mut inner = self.lock()?;
        debug!("RPC: notify {}", method);
        self.send(
            &mut inner,
            &RpcMessage::Notify {
                method: method.to_owned(),
                arg,
            },
        )
    }
}
