//! Protocol dispatch tables.
//!
//! A [`Protocol`] maps bare method names to [`ServeHandlerDescription`]s.
//! Each description knows how to build its typed argument out of the raw
//! msgpack record and which service method to call with it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rmpv::Value;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::message::{SeqNumber, from_value, to_value};
use crate::protocol::HandlerError;

/// Whether the caller waits for a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodType {
    Call,
    Notify,
}

/// Per-invocation context handed to every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub connection_id: u64,
    /// `None` for notifications.
    pub seqno: Option<SeqNumber>,
    /// Fully qualified method name.
    pub method: String,
}

impl CallContext {
    pub fn new(connection_id: u64, seqno: Option<SeqNumber>, method: impl Into<String>) -> Self {
        Self {
            connection_id,
            seqno,
            method: method.into(),
        }
    }
}

/// The argument record did not decode into what the method expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid argument for {method}: expected {expected}: {detail}")]
pub struct TypeError {
    pub method: String,
    pub expected: &'static str,
    pub detail: String,
}

/// Why a handler produced no result.
#[derive(Debug)]
pub enum DispatchError {
    Type(TypeError),
    Handler(HandlerError),
}

impl From<TypeError> for DispatchError {
    fn from(e: TypeError) -> Self {
        DispatchError::Type(e)
    }
}

impl From<HandlerError> for DispatchError {
    fn from(e: HandlerError) -> Self {
        DispatchError::Handler(e)
    }
}

pub type HandlerFn = Arc<dyn Fn(&CallContext, Value) -> Result<Value, DispatchError> + Send + Sync>;

/// One dispatch-table entry.
#[derive(Clone)]
pub struct ServeHandlerDescription {
    pub method_type: MethodType,
    pub handler: HandlerFn,
}

impl ServeHandlerDescription {
    /// Entry for a method whose caller waits for a result.
    pub fn call<A, R, F>(f: F) -> Self
    where
        A: DeserializeOwned,
        R: Serialize,
        F: Fn(&CallContext, A) -> Result<R, HandlerError> + Send + Sync + 'static,
    {
        Self {
            method_type: MethodType::Call,
            handler: Arc::new(move |ctx, raw| {
                let arg = decode_arg::<A>(&ctx.method, raw)?;
                let ret = f(ctx, arg)?;
                to_value(&ret).map_err(|e| DispatchError::Handler(HandlerError::Other(e.into())))
            }),
        }
    }

    /// Entry for a fire-and-forget notification.
    pub fn notify<A, F>(f: F) -> Self
    where
        A: DeserializeOwned,
        F: Fn(&CallContext, A) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self {
            method_type: MethodType::Notify,
            handler: Arc::new(move |ctx, raw| {
                let arg = decode_arg::<A>(&ctx.method, raw)?;
                f(ctx, arg)?;
                Ok(Value::Nil)
            }),
        }
    }

    pub fn invoke(&self, ctx: &CallContext, arg: Value) -> Result<Value, DispatchError> {
        (self.handler)(ctx, arg)
    }
}

impl fmt::Debug for ServeHandlerDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServeHandlerDescription")
            .field("method_type", &self.method_type)
            .finish_non_exhaustive()
    }
}

/// Build the typed argument. A missing record counts as an empty one.
fn decode_arg<A: DeserializeOwned>(method: &str, raw: Value) -> Result<A, TypeError> {
    let raw = if raw.is_nil() { Value::Map(Vec::new()) } else { raw };
    from_value::<A>(&raw).map_err(|e| TypeError {
        method: method.to_owned(),
        expected: std::any::type_name::<A>(),
        detail: e.to_string(),
    })
}

/// A named collection of methods, e.g. `keybase.1.login`.
#[derive(Debug, Clone)]
pub struct Protocol {
    pub name: String,
    pub methods: HashMap<String, ServeHandlerDescription>,
}

impl Protocol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: HashMap::new(),
        }
    }

    /// Builder-style registration.
    #[must_use]
    pub fn method(mut self, name: &str, desc: ServeHandlerDescription) -> Self {
        self.methods.insert(name.to_owned(), desc);
        self
    }

    pub fn lookup(&self, method: &str) -> Option<&ServeHandlerDescription> {
        self.methods.get(method)
    }

    /// Fully qualified wire name of one of this protocol's methods.
    pub fn full_method_name(&self, method: &str) -> String {
        join_method_name(&self.name, method)
    }
}

/// `("keybase.1.login", "logout")` to `keybase.1.login.logout`.
pub fn join_method_name(protocol: &str, method: &str) -> String {
    format!("{protocol}.{method}")
}

/// Split `keybase.1.login.logout` into `("keybase.1.login", "logout")`.
pub fn split_method_name(full: &str) -> Option<(&str, &str)> {
    let (proto, method) = full.rsplit_once('.')?;
    if proto.is_empty() || method.is_empty() {
        return None;
    }
    Some((proto, method))
}
