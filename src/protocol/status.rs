//! Status objects and the bridge between handler errors and the wire.
//!
//! ```text
//!   handler ──HandlerError──► wrap_error ──Status──► Response.error
//!                                                        │
//!   caller ◄──anyhow::Error── ErrorUnwrapper ◄───────────┘
//! ```
//!
//! A `Status` with code `SCOk` means "no error" in both directions.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::common::{StringKVPair, nil_as_default};
use crate::error::RpcError;

protocol_enum! {
    /// Service status codes. Only the subset the bundled protocols use.
    pub enum StatusCode {
        SCOk = 0 => "SCOk",
        SCInputError = 100 => "SCInputError",
        SCLoginRequired = 201 => "SCLoginRequired",
        SCBadSession = 202 => "SCBadSession",
        SCBadLoginUserNotFound = 203 => "SCBadLoginUserNotFound",
        SCBadLoginPassword = 204 => "SCBadLoginPassword",
        SCNotFound = 205 => "SCNotFound",
        SCThrottleControl = 210 => "SCThrottleControl",
        SCDeleted = 216 => "SCDeleted",
        SCGeneric = 218 => "SCGeneric",
        SCExists = 230 => "SCExists",
        SCAlreadyLoggedIn = 235 => "SCAlreadyLoggedIn",
        SCCanceled = 237 => "SCCanceled",
        SCInputCanceled = 239 => "SCInputCanceled",
        SCBadUsername = 243 => "SCBadUsername",
        SCOffline = 267 => "SCOffline",
        SCReloginRequired = 274 => "SCReloginRequired",
        SCResolutionFailed = 275 => "SCResolutionFailed",
        SCProfileNotPublic = 276 => "SCProfileNotPublic",
        SCIdentifyFailed = 277 => "SCIdentifyFailed",
        SCNoSession = 283 => "SCNoSession",
        SCAccountReset = 290 => "SCAccountReset",
    }
}

// ── Status ───────────────────────────────────────────────────

/// Wire status record. Doubles as an error value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub code: i32,
    pub name: String,
    pub desc: String,
    #[serde(default, deserialize_with = "nil_as_default")]
    pub fields: Vec<StringKVPair>,
}

impl Status {
    /// Success status; an empty description becomes `"OK"`.
    pub fn ok(desc: &str) -> Self {
        let desc = if desc.is_empty() { "OK" } else { desc };
        Status {
            code: StatusCode::SCOk.value(),
            name: "OK".to_owned(),
            desc: desc.to_owned(),
            fields: Vec::new(),
        }
    }

    pub fn from_code(code: StatusCode, message: &str) -> Self {
        match AppError::new(code, message) {
            Some(e) => e.to_status(),
            None => Status::ok(message),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::SCOk.value()
    }

    /// Typed code, if it is one this crate knows.
    pub fn status_code(&self) -> Option<StatusCode> {
        StatusCode::try_from(self.code).ok()
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|kv| kv.key == key)
            .map(|kv| kv.value.as_str())
    }

    /// `Ok(())` for a success status, the status itself otherwise.
    pub fn into_result(self) -> Result<(), Status> {
        if self.is_ok() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return Ok(());
        }
        write!(f, "{} ({}/{})", self.desc, self.name, self.code)
    }
}

impl std::error::Error for Status {}

// ── AppError ─────────────────────────────────────────────────

/// An application error carrying a status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    code: StatusCode,
    message: String,
}

impl AppError {
    /// `None` for `SCOk`: success is not an error.
    pub fn new(code: StatusCode, message: impl Into<String>) -> Option<Self> {
        if code == StatusCode::SCOk {
            return None;
        }
        Some(AppError {
            code,
            message: message.into(),
        })
    }

    pub fn from_error(err: &dyn std::error::Error) -> Self {
        AppError {
            code: StatusCode::SCGeneric,
            message: err.to_string(),
        }
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {}

// ── ToStatus / HandlerError ──────────────────────────────────

/// Something that can be turned into a wire status.
pub trait ToStatus {
    fn to_status(&self) -> Status;
}

impl ToStatus for Status {
    fn to_status(&self) -> Status {
        self.clone()
    }
}

impl ToStatus for AppError {
    fn to_status(&self) -> Status {
        Status {
            code: self.code.value(),
            name: "ERROR".to_owned(),
            desc: self.message.clone(),
            fields: Vec::new(),
        }
    }
}

/// Error returned by protocol handlers.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Already a wire status; sent as is.
    #[error("{0}")]
    Status(Status),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn from_status<E: ToStatus + ?Sized>(e: &E) -> Self {
        HandlerError::Status(e.to_status())
    }

    /// Shorthand for a coded application error.
    pub fn app(code: StatusCode, message: impl Into<String>) -> Self {
        match AppError::new(code, message) {
            Some(e) => HandlerError::from_status(&e),
            None => HandlerError::Status(Status::ok("")),
        }
    }
}

impl From<Status> for HandlerError {
    fn from(s: Status) -> Self {
        HandlerError::Status(s)
    }
}

impl From<AppError> for HandlerError {
    fn from(e: AppError) -> Self {
        HandlerError::from_status(&e)
    }
}

impl From<super::ParseError> for HandlerError {
    fn from(e: super::ParseError) -> Self {
        HandlerError::Other(e.into())
    }
}

/// Convert a handler error into the status sent on the wire.
pub fn wrap_error(err: Option<&HandlerError>) -> Option<Status> {
    match err? {
        HandlerError::Status(s) => Some(s.clone()),
        HandlerError::Other(e) => {
            for cause in e.chain() {
                if let Some(s) = cause.downcast_ref::<Status>() {
                    return Some(s.clone());
                }
                if let Some(a) = cause.downcast_ref::<AppError>() {
                    return Some(a.to_status());
                }
            }
            Some(Status {
                code: StatusCode::SCGeneric.value(),
                name: "GENERIC".to_owned(),
                desc: e.to_string(),
                fields: Vec::new(),
            })
        }
    }
}

// ── ErrorUnwrapper ───────────────────────────────────────────

pub type Upcaster = Arc<dyn Fn(Status) -> anyhow::Error + Send + Sync>;

/// Turns the error slot of a response back into an application error.
#[derive(Clone, Default)]
pub struct ErrorUnwrapper {
    pub upcaster: Option<Upcaster>,
}

impl ErrorUnwrapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upcaster(
        f: impl Fn(Status) -> anyhow::Error + Send + Sync + 'static,
    ) -> Self {
        ErrorUnwrapper {
            upcaster: Some(Arc::new(f)),
        }
    }

    /// `Ok(None)` when there is no error, `Ok(Some(app_err))` for a failed
    /// call, `Err` when the slot is not a status at all.
    pub fn unwrap_error(&self, value: &rmpv::Value) -> Result<Option<anyhow::Error>, RpcError> {
        if value.is_nil() {
            return Ok(None);
        }
        let status: Status = crate::rpc::from_value(value).map_err(|e| {
            RpcError::Dispatch(format!("error converting status to keybase1.Status object: {e}"))
        })?;
        if status.is_ok() {
            return Ok(None);
        }
        Ok(Some(match &self.upcaster {
            Some(up) => up(status),
            None => anyhow::Error::new(status),
        }))
    }
}

impl fmt::Debug for ErrorUnwrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorUnwrapper")
            .field("upcaster", &self.upcaster.is_some())
            .finish()
    }
}

// ── Tests ────────────────────────────────────────────────────
