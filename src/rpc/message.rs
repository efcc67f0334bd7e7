//! msgpack-RPC message model.
//!
//! ```text
//! Call      [0, seqno, method, [arg]]
//! Response  [1, seqno, error, result]
//! Notify    [2, method, [arg]]
//! Cancel    [3, seqno, method]
//! ```
//!
//! `arg` is a single record encoded as a map keyed by wire field names.

use rmpv::Value;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::codec::CodecError;

pub type SeqNumber = u32;

const TYPE_CALL: i64 = 0;
const TYPE_RESPONSE: i64 = 1;
const TYPE_NOTIFY: i64 = 2;
const TYPE_CANCEL: i64 = 3;

/// One decoded RPC message.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcMessage {
    Call {
        seqno: SeqNumber,
        method: String,
        arg: Value,
    },
    Response {
        seqno: SeqNumber,
        error: Value,
        result: Value,
    },
    Notify {
        method: String,
        arg: Value,
    },
    Cancel {
        seqno: SeqNumber,
        method: String,
    },
}

impl RpcMessage {
    /// Short name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            RpcMessage::Call { .. } => "call",
            RpcMessage::Response { .. } => "response",
            RpcMessage::Notify { .. } => "notify",
            RpcMessage::Cancel { .. } => "cancel",
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RpcMessage::Call { seqno, method, arg } => Value::Array(vec![
                Value::from(TYPE_CALL),
                Value::from(*seqno),
                Value::from(method.as_str()),
                Value::Array(vec![arg.clone()]),
            ]),
            RpcMessage::Response {
                seqno,
                error,
                result,
            } => Value::Array(vec![
                Value::from(TYPE_RESPONSE),
                Value::from(*seqno),
                error.clone(),
                result.clone(),
            ]),
            RpcMessage::Notify { method, arg } => Value::Array(vec![
                Value::from(TYPE_NOTIFY),
                Value::from(method.as_str()),
                Value::Array(vec![arg.clone()]),
            ]),
            RpcMessage::Cancel { seqno, method } => Value::Array(vec![
                Value::from(TYPE_CANCEL),
                Value::from(*seqno),
                Value::from(method.as_str()),
            ]),
        }
    }

    /// Serialize to a msgpack payload (no length prefix).
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        rmpv::encode::write_value(&mut out, &self.to_value())
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(out)
    }

    /// Parse a msgpack payload. Trailing bytes are rejected.
    pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
        let mut rd = payload;
        let value =
            rmpv::decode::read_value(&mut rd).map_err(|e| CodecError::Decode(e.to_string()))?;
        if !rd.is_empty() {
            return Err(CodecError::Malformed(format!(
                "{} trailing bytes after message",
                rd.len()
            )));
        }
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, CodecError> {
        let Value::Array(items) = value else {
            return Err(CodecError::Malformed("message is not an array".into()));
        };
        let typ = items
            .first()
            .and_then(Value::as_i64)
            .ok_or_else(|| CodecError::Malformed("missing message type".into()))?;

        let mut it = items.into_iter().skip(1);
        let msg = match typ {
            TYPE_CALL => {
                expect_len(&it, 3, "call")?;
                RpcMessage::Call {
                    seqno: take_seqno(&mut it)?,
                    method: take_method(&mut it)?,
                    arg: take_arg(&mut it)?,
                }
            }
            TYPE_RESPONSE => {
                expect_len(&it, 3, "response")?;
                RpcMessage::Response {
                    seqno: take_seqno(&mut it)?,
                    error: it.next().unwrap_or(Value::Nil),
                    result: it.next().unwrap_or(Value::Nil),
                }
            }
            TYPE_NOTIFY => {
                expect_len(&it, 2, "notify")?;
                RpcMessage::Notify {
                    method: take_method(&mut it)?,
                    arg: take_arg(&mut it)?,
                }
            }
            TYPE_CANCEL => {
                expect_len(&it, 2, "cancel")?;
                RpcMessage::Cancel {
                    seqno: take_seqno(&mut it)?,
                    method: take_method(&mut it)?,
                }
            }
            other => {
                return Err(CodecError::Malformed(format!("unknown message type {other}")));
            }
        };
        Ok(msg)
    }
}

fn expect_len(
    it: &impl ExactSizeIterator,
    want: usize,
    kind: &str,
) -> Result<(), CodecError> {
    if it.len() == want {
        Ok(())
    } else {
        Err(CodecError::Malformed(format!(
            "{kind} has {} fields, want {want}",
            it.len() + 1
        )))
    }
}

fn take_seqno(it: &mut impl Iterator<Item = Value>) -> Result<SeqNumber, CodecError> {
    it.next()
        .and_then(|v| v.as_u64())
        .and_then(|n| SeqNumber::try_from(n).ok())
        .ok_or_else(|| CodecError::Malformed("bad sequence number".into()))
}

fn take_method(it: &mut impl Iterator<Item = Value>) -> Result<String, CodecError> {
    match it.next() {
        Some(Value::String(s)) => s
            .into_str()
            .ok_or_else(|| CodecError::Malformed("method name is not utf-8".into())),
        _ => Err(CodecError::Malformed("bad method name".into())),
    }
}

/// Unwrap the single-element argument array. An empty array means a
/// method without arguments.
fn take_arg(it: &mut impl Iterator<Item = Value>) -> Result<Value, CodecError> {
    match it.next() {
        Some(Value::Array(mut args)) => {
            if args.len() > 1 {
                return Err(CodecError::Malformed(format!(
                    "expected one argument record, got {}",
                    args.len()
                )));
            }
            Ok(args.pop().unwrap_or(Value::Nil))
        }
        _ => Err(CodecError::Malformed("arguments are not an array".into())),
    }
}

// ── Value helpers ────────────────────────────────────────────

/// Serialize a record the way it travels on the wire: structs become
/// maps keyed by their field names.
pub fn to_value<T: Serialize + ?Sized>(v: &T) -> Result<Value, CodecError> {
    let bytes = rmp_serde::to_vec_named(v)?;
    rmpv::decode::read_value(&mut bytes.as_slice()).map_err(|e| CodecError::Decode(e.to_string()))
}

pub fn from_value<T: DeserializeOwned>(v: &Value) -> Result<T, CodecError> {
    let mut bytes = Vec::new();
    rmpv::encode::write_value(&mut bytes, v).map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(rmp_serde::from_slice(&bytes)?)
}

// ── Tests ────────────────────────────────────────────────────
