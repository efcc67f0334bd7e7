//! `keybase.1.NotifySession`: session change notifications pushed by the
//! service.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::status::HandlerError;
use crate::error::RpcError;
use crate::rpc::{
    CallContext, GenericClient, Protocol, ServeHandlerDescription, call_typed, join_method_name, notify_typed,
};

pub const PROTOCOL_NAME: &str = "keybase.1.NotifySession";

fn method(name: &str) -> String {
    join_method_name(PROTOCOL_NAME, name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedOutArg {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedInArg {
    pub username: String,
}

pub trait NotifySessionInterface: Send + Sync {
    fn logged_out(&self, ctx: &CallContext) -> Result<(), HandlerError>;

    fn logged_in(&self, ctx: &CallContext, username: String) -> Result<(), HandlerError>;
}

pub fn notify_session_protocol<I: NotifySessionInterface + ?Sized + 'static>(i: Arc<I>) -> Protocol {
    Protocol::new(PROTOCOL_NAME)
        .method("loggedOut", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::notify(move |ctx, _: LoggedOutArg| i.logged_out(ctx))
        })
        .method(
            "loggedIn",
            ServeHandlerDescription::call(move |ctx, a: LoggedInArg| i.logged_in(ctx, a.username)),
        )
}

pub struct NotifySessionClient<C> {
    pub cli: C,
}

impl<C: GenericClient> NotifySessionClient<C> {
    pub fn new(cli: C) -> Self {
        Self { cli }
    }

    /// Fire and forget; no response is expected.
    pub fn logged_out(&self) -> Result<(), RpcError> {
        notify_typed(&self.cli, &method("loggedOut"), &LoggedOutArg {}, None)
    }

    pub fn logged_in(&self, username: &str) -> Result<(), RpcError> {
        let arg = LoggedInArg {
            username: username.to_owned(),
        };
        call_typed(&self.cli, &method("loggedIn"), &arg, None)
    }
}
